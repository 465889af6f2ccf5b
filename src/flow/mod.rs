// Flow metrics derived from cycle records: cumulative flow, throughput, WIP

pub mod cfd;
pub mod throughput;
pub mod wip;

pub use cfd::{calculate_cfd, CfdRow, CfdTable};
pub use throughput::{calculate_throughput, Frequency, ThroughputPeriod, ThroughputSeries};
pub use wip::{ageing_wip, net_flow, weekly_wip, AgeingItem, NetFlowWeek, WipWeek};
