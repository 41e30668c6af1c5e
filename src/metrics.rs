/// Counters updated in place by the engine, owned by the caller.
///
/// One unit per page read, per key comparison, per output page written, and
/// per record copied into the tuple buffer. Initialized to zero
/// ([`Metrics::default`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub num_reads: u64,
    pub num_compar: u64,
    pub num_writes: u64,
    pub num_memcpys: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}
