// The text report printed by `tally`.

use vote_merge::{Group, TallyTable};

use crate::collect::config_reader::TopicSettings;

const BAR_WIDTH: u64 = 20;

/// The display title of a topic id, or the id itself when it is not in the catalog.
pub fn topic_title<'a>(topics: &'a [TopicSettings], id: &'a str) -> &'a str {
    topics
        .iter()
        .find(|t| t.id == id)
        .map(|t| t.title.as_str())
        .unwrap_or(id)
}

// Rounded to the nearest character.
fn bar(count: u64, max_count: u64) -> String {
    let len = (count * BAR_WIDTH + max_count / 2) / max_count;
    "#".repeat(len as usize)
}

fn group_name(g: Group) -> &'static str {
    match g {
        Group::Baseline => "Neutral",
        Group::Treatment => "Nudged",
    }
}

/// Catalog topics come first, in catalog order, even without votes. Topics
/// that received votes but are not in the catalog follow, sorted by id.
pub fn render_report(title: &str, tallies: &TallyTable, topics: &[TopicSettings]) -> String {
    let mut ids: Vec<&str> = topics.iter().map(|t| t.id.as_str()).collect();
    for c in tallies.categories() {
        if !ids.contains(&c) {
            ids.push(c);
        }
    }

    let max_count = tallies.max_count();
    let mut lines: Vec<String> = vec![
        title.to_string(),
        format!(
            "Totals: {} {} · {} {}",
            group_name(Group::Baseline),
            tallies.total(Group::Baseline),
            group_name(Group::Treatment),
            tallies.total(Group::Treatment)
        ),
    ];
    for id in ids {
        lines.push(String::new());
        let n = tallies.count(Group::Baseline, id);
        let u = tallies.count(Group::Treatment, id);
        lines.push(format!("{}  (N:{} · U:{})", topic_title(topics, id), n, u));
        for g in Group::ALL {
            let count = tallies.count(g, id);
            lines.push(format!(
                "  {:<8} {:<width$} {}",
                group_name(g),
                bar(count, max_count),
                count,
                width = BAR_WIDTH as usize
            ));
        }
    }
    lines.join("\n")
}
