// Driver package / 驱动包
pub mod ipfs;

use crate::storage::{Result, StorageManager};

/// Register all drivers to StorageManager / 注册所有驱动
pub async fn register_all(manager: &StorageManager) -> Result<()> {
    // Register unsigned IPFS gateway driver / 注册IPFS网关驱动
    manager.register_factory(Box::new(ipfs::IpfsDriverFactory)).await?;
    // Register signed IPFS API driver / 注册IPFS签名驱动
    manager.register_factory(Box::new(ipfs::IpfsSignedDriverFactory)).await?;
    Ok(())
}
