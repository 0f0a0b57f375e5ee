#![forbid(unsafe_code)]

/// A single row of a process snapshot. Transient: rebuilt on every
/// enumeration, never updated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: i32,
    pub name: String,
    pub status: String,
    pub memory_bytes: u64,
}
