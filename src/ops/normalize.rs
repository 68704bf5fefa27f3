use std::collections::HashMap;

use chrono::Utc;

use crate::model::task::{RawTask, Task};

/// Source of millisecond timestamps for new ids
pub type Clock = Box<dyn Fn() -> i64>;

/// Hands out task ids of the form `<slug>_<millis>`.
///
/// Ids minted for id-less records from the host are remembered per
/// (name, occurrence), so the same record keeps its id across every
/// snapshot it appears in.
pub struct IdMinter {
    clock: Clock,
    last_millis: i64,
    assigned: HashMap<(String, usize), String>,
}

impl Default for IdMinter {
    fn default() -> Self {
        IdMinter::with_clock(Box::new(|| Utc::now().timestamp_millis()))
    }
}

impl IdMinter {
    pub fn with_clock(clock: Clock) -> Self {
        IdMinter {
            clock,
            last_millis: i64::MIN,
            assigned: HashMap::new(),
        }
    }

    /// A new id that has never been handed out by this minter
    pub fn fresh(&mut self, name: &str) -> String {
        let now = (self.clock)();
        // Two ids in the same millisecond still differ
        let millis = if now <= self.last_millis {
            self.last_millis + 1
        } else {
            now
        };
        self.last_millis = millis;
        format!("{}_{}", slug(name), millis)
    }

    /// The id for the `occurrence`-th id-less record called `name`
    fn for_record(&mut self, name: &str, occurrence: usize) -> String {
        let key = (name.to_lowercase(), occurrence);
        if let Some(id) = self.assigned.get(&key) {
            return id.clone();
        }
        let id = self.fresh(name);
        self.assigned.insert(key, id.clone());
        id
    }
}

/// Lowercase the name and replace every non-word character with `_`
pub fn slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Pad with `false` or truncate so the result has exactly `len` flags
pub fn resize_ticks(ticks: &[bool], len: usize) -> Vec<bool> {
    let mut out: Vec<bool> = ticks.iter().copied().take(len).collect();
    out.resize(len, false);
    out
}

/// Turn host records into canonical tasks.
///
/// Records without a usable name are dropped. Output order follows input
/// order; the input is left untouched.
pub fn normalize(raw: &[RawTask], tick_count: usize, ids: &mut IdMinter) -> Vec<Task> {
    let mut unnamed_seen: HashMap<String, usize> = HashMap::new();
    let mut tasks = Vec::with_capacity(raw.len());

    for record in raw {
        let name = match record.name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => {
                tracing::debug!(id = ?record.id, "dropping task record without a name");
                continue;
            }
        };

        let id = match record.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                let seen = unnamed_seen.entry(name.to_lowercase()).or_insert(0);
                let id = ids.for_record(&name, *seen);
                *seen += 1;
                id
            }
        };

        let category = record
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        tasks.push(Task {
            id,
            name,
            category,
            ticks: resize_ticks(&record.ticks, tick_count),
        });
    }

    tasks
}
