//! Serves recorded interactions back in order.

use std::collections::HashMap;

use super::format::{Cassette, Interaction};

/// Interactions are queued per `(port, method)` pair.
type QueueKey = (String, String);

/// Replays a cassette, handing out interactions sequentially per
/// port/method pair.
pub struct CassetteReplayer {
    queues: HashMap<QueueKey, Vec<Interaction>>,
    cursors: HashMap<QueueKey, usize>,
}

impl CassetteReplayer {
    /// Indexes a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        Self::for_ports(cassette, |_| true)
    }

    /// Indexes only the interactions of ports accepted by `keep`.
    #[must_use]
    pub fn for_ports(cassette: &Cassette, keep: impl Fn(&str) -> bool) -> Self {
        let mut queues: HashMap<QueueKey, Vec<Interaction>> = HashMap::new();
        for interaction in cassette.interactions.iter().filter(|i| keep(&i.port)) {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push(interaction.clone());
        }
        let cursors = queues.keys().map(|k| (k.clone(), 0)).collect();
        Self { queues, cursors }
    }

    /// Returns the next interaction recorded for `port`/`method`.
    ///
    /// # Panics
    ///
    /// Panics if the pair was never recorded or its queue is exhausted. A
    /// replay that asks for more than was recorded has diverged from the
    /// original run and cannot produce a faithful report.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> &Interaction {
        let key = (port.to_string(), method.to_string());

        let Some(queue) = self.queues.get(&key) else {
            let mut available: Vec<String> =
                self.queues.keys().map(|(p, m)| format!("{p}::{m}")).collect();
            available.sort();
            panic!(
                "Cassette exhausted: no interactions recorded for port={port:?} method={method:?}. \
                 Available port::method pairs: [{}]",
                available.join(", ")
            );
        };

        let cursor = self.cursors.entry(key).or_insert(0);
        assert!(
            *cursor < queue.len(),
            "Cassette exhausted: all {count} interactions for port={port:?} method={method:?} \
             have been consumed. Last interaction was seq={last_seq}.",
            count = queue.len(),
            last_seq = queue.last().map_or(0, |i| i.seq),
        );

        let interaction = &queue[*cursor];
        *cursor += 1;
        interaction
    }

    /// Returns how many interactions are still queued across all pairs.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queues
            .iter()
            .map(|(key, queue)| queue.len() - self.cursors.get(key).copied().unwrap_or(0))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn interaction(seq: u64, port: &str, method: &str, output: serde_json::Value) -> Interaction {
        Interaction {
            seq,
            port: port.into(),
            method: method.into(),
            input: json!(null),
            output,
        }
    }

    fn cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette { name: "test".into(), recorded_at: Utc::now(), source: "test".into(), interactions }
    }

    #[test]
    fn serves_each_pair_in_recorded_order() {
        let cassette = cassette(vec![
            interaction(0, "motor:1", "position", json!(10)),
            interaction(1, "clock", "now_micros", json!(0)),
            interaction(2, "motor:1", "position", json!(25)),
        ]);
        let mut replayer = CassetteReplayer::new(&cassette);
        assert_eq!(replayer.remaining(), 3);

        assert_eq!(replayer.next_interaction("motor:1", "position").output, json!(10));
        assert_eq!(replayer.next_interaction("clock", "now_micros").output, json!(0));
        assert_eq!(replayer.next_interaction("motor:1", "position").seq, 2);
        assert_eq!(replayer.remaining(), 0);
    }

    #[test]
    fn for_ports_filters_other_devices() {
        let cassette = cassette(vec![
            interaction(0, "motor:1", "velocity", json!(1.0)),
            interaction(1, "motor:2", "velocity", json!(2.0)),
        ]);
        let mut replayer = CassetteReplayer::for_ports(&cassette, |p| p == "motor:2");
        assert_eq!(replayer.remaining(), 1);
        assert_eq!(replayer.next_interaction("motor:2", "velocity").output, json!(2.0));
    }

    #[test]
    #[should_panic(expected = "Cassette exhausted")]
    fn exhausted_queue_panics() {
        let cassette = cassette(vec![interaction(0, "clock", "now_micros", json!(5))]);
        let mut replayer = CassetteReplayer::new(&cassette);
        let _ = replayer.next_interaction("clock", "now_micros");
        let _ = replayer.next_interaction("clock", "now_micros");
    }

    #[test]
    #[should_panic(expected = "no interactions recorded")]
    fn unknown_port_panics() {
        let mut replayer = CassetteReplayer::new(&cassette(vec![]));
        let _ = replayer.next_interaction("motor:99", "position");
    }
}
