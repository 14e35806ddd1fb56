use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use aws_sdk_dynamodb::model::AttributeValue;
use serde::{Deserialize, Serialize};

pub const REPO_NAME: &str = "repo-name";
pub const TIMESTAMP: &str = "timestamp";
pub const VIEWS_COUNT: &str = "views-count";
pub const VIEWS_UNIQUES: &str = "views-uniques";
pub const CLONES_COUNT: &str = "clones-count";
pub const CLONES_UNIQUES: &str = "clones-uniques";

/// One of the two traffic series GitHub exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    Views,
    Clones,
}

impl Feed {
    pub const ALL: [Feed; 2] = [Feed::Views, Feed::Clones];

    /// Path segment of the endpoint, also the key of the array in its response.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Feed::Views => "views",
            Feed::Clones => "clones",
        }
    }
}

/// A single day of one feed, as returned by the traffic API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTraffic {
    pub timestamp: String,
    pub count: u64,
    pub uniques: u64,
}

/// Traffic of one repository on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficRecord {
    #[serde(rename = "repo-name")]
    pub repo_name: String,
    pub timestamp: String,
    #[serde(rename = "views-count")]
    pub views_count: u64,
    #[serde(rename = "views-uniques")]
    pub views_uniques: u64,
    #[serde(rename = "clones-count")]
    pub clones_count: u64,
    #[serde(rename = "clones-uniques")]
    pub clones_uniques: u64,
}

impl TrafficRecord {
    pub fn new(repo_name: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            repo_name: repo_name.into(),
            timestamp: timestamp.into(),
            views_count: 0,
            views_uniques: 0,
            clones_count: 0,
            clones_uniques: 0,
        }
    }

    fn apply(&mut self, feed: Feed, day: &DailyTraffic) {
        match feed {
            Feed::Views => {
                self.views_count = day.count;
                self.views_uniques = day.uniques;
            }
            Feed::Clones => {
                self.clones_count = day.count;
                self.clones_uniques = day.uniques;
            }
        }
    }

    pub fn to_item(&self) -> HashMap<String, AttributeValue> {
        HashMap::from([
            (REPO_NAME.to_string(), AttributeValue::S(self.repo_name.to_owned())),
            (TIMESTAMP.to_string(), AttributeValue::S(self.timestamp.to_owned())),
            (VIEWS_COUNT.to_string(), AttributeValue::N(self.views_count.to_string())),
            (VIEWS_UNIQUES.to_string(), AttributeValue::N(self.views_uniques.to_string())),
            (CLONES_COUNT.to_string(), AttributeValue::N(self.clones_count.to_string())),
            (CLONES_UNIQUES.to_string(), AttributeValue::N(self.clones_uniques.to_string())),
        ])
    }

    /// Rebuilds a record from a table item; `None` if any attribute is absent or mistyped.
    pub fn from_item(item: &HashMap<String, AttributeValue>) -> Option<Self> {
        let string = |key: &str| match item.get(key) {
            Some(AttributeValue::S(s)) => Some(s.to_owned()),
            _ => None,
        };
        let number = |key: &str| match item.get(key) {
            Some(AttributeValue::N(n)) => u64::from_str(n).ok(),
            _ => None,
        };
        Some(Self {
            repo_name: string(REPO_NAME)?,
            timestamp: string(TIMESTAMP)?,
            views_count: number(VIEWS_COUNT)?,
            views_uniques: number(VIEWS_UNIQUES)?,
            clones_count: number(CLONES_COUNT)?,
            clones_uniques: number(CLONES_UNIQUES)?,
        })
    }
}

/// Combines the views and clones feeds of one repository into daily records.
///
/// Each feed only ever writes its own pair of counters, so the order in which
/// feeds are added does not change the result. Days missing from a feed keep
/// zero for that feed.
#[derive(Debug)]
pub struct TrafficMerger {
    repo_name: String,
    days: BTreeMap<String, TrafficRecord>,
}

impl TrafficMerger {
    pub fn new(repo_name: impl Into<String>) -> Self {
        Self { repo_name: repo_name.into(), days: BTreeMap::new() }
    }

    pub fn add(&mut self, feed: Feed, entries: &[DailyTraffic]) {
        for day in entries {
            let repo_name = &self.repo_name;
            self.days
                .entry(day.timestamp.to_owned())
                .or_insert_with(|| TrafficRecord::new(repo_name.to_owned(), day.timestamp.to_owned()))
                .apply(feed, day);
        }
    }

    /// Records sorted by timestamp.
    pub fn into_records(self) -> Vec<TrafficRecord> {
        self.days.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(timestamp: &str, count: u64, uniques: u64) -> DailyTraffic {
        DailyTraffic { timestamp: timestamp.to_string(), count, uniques }
    }

    fn record(ts: &str, views: (u64, u64), clones: (u64, u64)) -> TrafficRecord {
        TrafficRecord {
            repo_name: "R".to_string(),
            timestamp: ts.to_string(),
            views_count: views.0,
            views_uniques: views.1,
            clones_count: clones.0,
            clones_uniques: clones.1,
        }
    }

    #[test]
    fn test_merge_zero_fills_missing_feed() {
        let views = vec![day("2024-01-01", 10, 4)];
        let clones = vec![day("2024-01-01", 2, 1), day("2024-01-02", 1, 1)];

        let mut merger = TrafficMerger::new("R");
        merger.add(Feed::Views, &views);
        merger.add(Feed::Clones, &clones);

        assert_eq!(
            merger.into_records(),
            vec![
                record("2024-01-01", (10, 4), (2, 1)),
                record("2024-01-02", (0, 0), (1, 1)),
            ]
        );
    }

    #[test]
    fn test_merge_is_order_independent() {
        let views = vec![day("2024-03-01", 7, 3), day("2024-03-03", 1, 1)];
        let clones = vec![day("2024-03-02", 5, 2), day("2024-03-03", 4, 4)];

        let mut forward = TrafficMerger::new("R");
        forward.add(Feed::Views, &views);
        forward.add(Feed::Clones, &clones);

        let mut backward = TrafficMerger::new("R");
        backward.add(Feed::Clones, &clones);
        backward.add(Feed::Views, &views);

        let mut interleaved = TrafficMerger::new("R");
        interleaved.add(Feed::Clones, &clones[1..]);
        interleaved.add(Feed::Views, &views[..1]);
        interleaved.add(Feed::Clones, &clones[..1]);
        interleaved.add(Feed::Views, &views[1..]);

        let expected = forward.into_records();
        assert_eq!(expected.len(), 3);
        assert_eq!(backward.into_records(), expected);
        assert_eq!(interleaved.into_records(), expected);
    }

    #[test]
    fn test_empty_feeds() {
        let mut merger = TrafficMerger::new("R");
        merger.add(Feed::Views, &[]);
        merger.add(Feed::Clones, &[]);
        assert!(merger.into_records().is_empty());
    }

    #[test]
    fn test_item_round_trip() {
        let original = record("2024-01-01T00:00:00Z", (10, 4), (2, 1));
        let item = original.to_item();
        assert_eq!(item.get(VIEWS_COUNT), Some(&AttributeValue::N("10".to_string())));
        assert_eq!(item.get(REPO_NAME), Some(&AttributeValue::S("R".to_string())));
        assert_eq!(TrafficRecord::from_item(&item), Some(original));
    }

    #[test]
    fn test_from_item_rejects_mistyped_counter() {
        let mut item = record("2024-01-01", (1, 1), (1, 1)).to_item();
        item.insert(CLONES_COUNT.to_string(), AttributeValue::S("1".to_string()));
        assert_eq!(TrafficRecord::from_item(&item), None);
        item.remove(CLONES_COUNT);
        assert_eq!(TrafficRecord::from_item(&item), None);
    }

    #[test]
    fn test_record_serializes_with_table_names() {
        let json = serde_json::to_value(record("2024-01-02", (0, 0), (1, 1))).unwrap();
        assert_eq!(json["repo-name"], "R");
        assert_eq!(json["views-count"], 0);
        assert_eq!(json["clones-uniques"], 1);
    }
}
