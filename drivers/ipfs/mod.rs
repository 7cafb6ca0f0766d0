//! IPFS网关存储驱动 / IPFS gateway storage driver
//!
//! Two backend protocols share one driver:
//! - `ipfs`: unsigned gateway API (`/flapi/*`, objects under `/flipfs/`)
//! - `ipfs_signed`: API requiring an md5 signature on each request
//!   (`/api/*`, objects under `/file/`)

mod driver;
mod factory;
mod gateway;
mod protocol;
pub mod signed;
mod util;

#[cfg(test)]
pub(crate) mod mock;

pub use driver::IpfsDriver;
pub use factory::{IpfsDriverFactory, IpfsSignedDriverFactory};
pub use gateway::GatewayProtocol;
pub use protocol::{FormRequest, ProtocolAdapter, UploadRequest};
pub use signed::{SignedProtocol, SignedRequest};
pub use util::md5_hex;
