use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{DriverContext, Result, StorageDriver, StorageError};

pub type DriverBox = Arc<Box<dyn StorageDriver>>;

/// Driver factory trait / 驱动工厂 trait
pub trait DriverFactory: Send + Sync {
    /// Driver type name / 驱动类型名称
    fn driver_type(&self) -> &'static str;

    /// Create driver instance / 创建驱动实例
    fn create_driver(&self, context: &DriverContext) -> Result<Box<dyn StorageDriver>>;
}

/// Storage manager, one shared driver per driver type / 存储管理器
#[derive(Clone)]
pub struct StorageManager {
    context: DriverContext,
    drivers: Arc<RwLock<HashMap<String, DriverBox>>>,
    factories: Arc<RwLock<HashMap<String, Arc<Box<dyn DriverFactory>>>>>,
}

impl StorageManager {
    pub fn new(context: DriverContext) -> Self {
        Self {
            context,
            drivers: Arc::new(RwLock::new(HashMap::new())),
            factories: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register driver factory / 注册驱动工厂
    pub async fn register_factory(&self, factory: Box<dyn DriverFactory>) -> Result<()> {
        let driver_type = factory.driver_type().to_string();
        let factory_box = Arc::new(factory);

        let mut factories = self.factories.write().await;
        factories.insert(driver_type.clone(), factory_box);

        tracing::info!("Driver factory registered: {}", driver_type);
        Ok(())
    }

    /// Get the shared driver for a type, creating it on first use / 获取驱动实例
    pub async fn instance(&self, driver_type: &str) -> Result<DriverBox> {
        if let Some(driver) = self.drivers.read().await.get(driver_type) {
            return Ok(driver.clone());
        }

        let factory = {
            let factories = self.factories.read().await;
            factories.get(driver_type)
                .cloned()
                .ok_or_else(|| StorageError::Configuration(format!("Driver type not found: {}", driver_type)))?
        };

        let mut drivers = self.drivers.write().await;
        // Another caller may have created it while we waited for the lock
        if let Some(driver) = drivers.get(driver_type) {
            return Ok(driver.clone());
        }

        let driver: DriverBox = match factory.create_driver(&self.context) {
            Ok(driver) => Arc::new(driver),
            Err(e) => {
                tracing::error!("Driver creation failed: {} - {}", driver_type, e);
                return Err(e);
            }
        };
        drivers.insert(driver_type.to_string(), driver.clone());

        tracing::info!("Driver created: {} ({})", driver_type, driver.name());
        Ok(driver)
    }

    /// Drop the cached instance so the next lookup rebuilds it / 移除驱动实例
    pub async fn remove_driver(&self, driver_type: &str) -> Result<()> {
        let mut drivers = self.drivers.write().await;
        drivers.remove(driver_type)
            .ok_or_else(|| StorageError::Configuration(format!("Driver not found: {}", driver_type)))?;

        tracing::info!("Driver removed: {}", driver_type);
        Ok(())
    }

    /// List all available driver types / 列出所有可用的驱动类型
    pub async fn list_driver_types(&self) -> Vec<String> {
        let factories = self.factories.read().await;
        let mut types: Vec<String> = factories.keys().cloned().collect();
        types.sort();
        types
    }
}
