use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub expanded_nodes: usize,
    pub generated_nodes: usize,
    pub updated_nodes: usize,
    pub time_us: u64,
}

impl Stats {
    pub fn print(&self) {
        info!(
            "Time(microseconds) {:?} Expanded nodes number: {:?} Generated nodes number: {:?} Updated nodes number: {:?}",
            self.time_us, self.expanded_nodes, self.generated_nodes, self.updated_nodes
        );
    }
}
