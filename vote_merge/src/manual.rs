/*!

This is the long-form manual for `vote_merge` and `votemerge`.

## Votes

A vote is one submission of the class poll. It records:
* the group the voter was shown: `neutral` (topics in shuffled order, plain
  descriptions) or `nudged` (one topic highlighted and pre-selected). The
  aliases `baseline` and `treatment` are accepted when reading.
* the chosen topic id, for example `mental-health`
* the submission instant, as an ISO-8601 string with milliseconds
* optionally, the user agent of the browser or tool that submitted it

Two votes with the same group, topic and instant are the same vote. The user
agent does not count: if the same vote arrives from two places with different
user agents, the first one read is kept.

## Sources

### `local`

A directory with one JSON file per group, `autonomy-demo-local-neutral.json`
and `autonomy-demo-local-nudged.json`. Each holds an array of objects:

```text
[{"variant":"nudged","choice":"mental-health","ts":"2024-03-01T10:00:00.000Z","userAgent":"Mozilla/5.0"}]
```

A missing or unreadable file counts as an empty array. `votemerge submit`
appends to these files.

### `remote`

A URL that answers a GET with a JSON array of the same objects, for example
a Google Apps Script web app backed by a sheet. When the URL is not set, not
reachable, or does not return JSON, the source is skipped with a warning.

### `csv`

Files exported by `votemerge export` (or by the voting page). Only names
ending in `.csv` are read; a directory is expanded to the `.csv` files it
contains. The format is:

```text
"variant","choice","timestamp","userAgent"
"nudged","mental-health","2024-03-01T10:00:00.000Z","Mozilla/5.0"
"neutral","politics","2024-03-01T10:00:05.123Z",""
```

Every field is a JSON string, so commas, quotes and line breaks inside a field
are safe. Columns are found by name and may come in any order. A field that is
not valid JSON is read as plain text. Rows with an unknown `variant` are
skipped. Importing the same file twice changes nothing.

## Precedence

Sources are merged in the order they are listed. Without a configuration file
the order is: remote, local, then the `--input` files in the order given.

## Configuration

```text
{
  "outputSettings": { "title": "Class Vote Results", "outputPath": "summary.json" },
  "sources": [
    { "provider": "remote", "url": "https://script.google.com/macros/s/.../exec", "timeoutSecs": 10 },
    { "provider": "local", "storeDir": "votes" },
    { "provider": "csv", "filePath": "exports" }
  ],
  "topics": [
    { "id": "mental-health", "title": "AI & Mental Health" }
  ]
}
```

All the fields are optional. Relative paths are resolved from the directory of
the configuration file. `topics` only controls the labels and the order of the
report; votes for topics that are not listed are still counted.

*/
