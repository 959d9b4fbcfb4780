// sdkup-aio/src/lib.rs
//! IO operations for sdkup (artifact files, checksums, package archives)

pub mod archive;
pub mod checksum;
pub mod fs;

pub use archive::{unpack_archive, write_archive, ArchiveEntry, ArchiveSource};
pub use checksum::{checksums_match, compute_checksum};
pub use fs::{artifact_size, promote_file};
