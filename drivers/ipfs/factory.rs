//! IPFS驱动工厂 / IPFS driver factories

use crate::storage::{DriverContext, DriverFactory, Result, StorageDriver};
use super::driver::IpfsDriver;
use super::gateway::GatewayProtocol;
use super::signed::SignedProtocol;

/// 无签名网关驱动工厂 / Gateway driver factory
pub struct IpfsDriverFactory;

impl DriverFactory for IpfsDriverFactory {
    fn driver_type(&self) -> &'static str {
        "ipfs"
    }

    fn create_driver(&self, ctx: &DriverContext) -> Result<Box<dyn StorageDriver>> {
        Ok(Box::new(IpfsDriver::new(
            GatewayProtocol,
            &ctx.config,
            &ctx.request,
            ctx.transport.clone(),
        )))
    }
}

/// 签名认证驱动工厂 / Signed API driver factory
pub struct IpfsSignedDriverFactory;

impl DriverFactory for IpfsSignedDriverFactory {
    fn driver_type(&self) -> &'static str {
        "ipfs_signed"
    }

    fn create_driver(&self, ctx: &DriverContext) -> Result<Box<dyn StorageDriver>> {
        if ctx.config.api_user.is_empty() || ctx.config.api_secret.is_empty() {
            tracing::warn!("Signed IPFS driver created without api_user or api_secret");
        }

        Ok(Box::new(IpfsDriver::new(
            SignedProtocol::from_config(&ctx.config),
            &ctx.config,
            &ctx.request,
            ctx.transport.clone(),
        )))
    }
}
