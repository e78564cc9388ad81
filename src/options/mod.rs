//! Per-operation option records and their argument compilers.
//!
//! Each record starts zero-valued, is built up with chainable setters, and
//! compiles to an ordered argument vector. Compilation is pure and
//! deterministic, and never fails: unset options contribute nothing.
//! Ordering is part of the contract — restic treats some tokens
//! positionally, so a flag never ends up without its value token.

mod backup;
mod filter;
mod forget;
mod restore;

pub use backup::BackupOptions;
pub use filter::FilterOptions;
pub use forget::ForgetOptions;
pub use restore::RestoreOptions;

/// Emits one `flag value` pair per entry, preserving caller order.
pub(crate) fn push_flag_values(args: &mut Vec<String>, flag: &str, values: &[String]) {
    for value in values {
        args.push(flag.to_string());
        args.push(value.clone());
    }
}
