//! IP 集合 API
//!
//! IP 集合挂在 VDC 作用域下，不属于某个边缘网关。

use tracing::info;

use crate::client::EdgeClient;
use crate::error::Result;
use crate::models::{IpSet, IpSetList};

const IPSET_PATH: &str = "/network/services/ipset";

/// IP 集合 API
pub struct IpSetApi<'a> {
    client: &'a EdgeClient,
    vdc_id: String,
}

impl<'a> IpSetApi<'a> {
    /// 创建新的 IP 集合 API 实例
    pub(crate) fn new(client: &'a EdgeClient, vdc_id: &str) -> Self {
        Self {
            client,
            vdc_id: vdc_id.to_string(),
        }
    }

    /// 查询作用域下所有 IP 集合
    pub async fn list(&self) -> Result<Vec<IpSet>> {
        info!("查询 IP 集合列表: {}", self.vdc_id);
        let list: IpSetList = self
            .client
            .get_xml(&format!("{}/scope/{}", IPSET_PATH, self.vdc_id))
            .await?;
        Ok(list.ip_sets)
    }

    /// 按名称查找 IP 集合
    pub async fn find_by_name(&self, name: &str) -> Result<Option<IpSet>> {
        Ok(self.list().await?.into_iter().find(|s| s.name == name))
    }

    /// 创建 IP 集合，返回 ID
    pub async fn create(&self, ip_set: &IpSet) -> Result<String> {
        ip_set.validate()?;
        info!("创建 IP 集合: {} -> {}", self.vdc_id, ip_set.name);
        self.client
            .post_xml(&format!("{}/{}", IPSET_PATH, self.vdc_id), ip_set)
            .await
    }

    pub async fn get(&self, ip_set_id: &str) -> Result<IpSet> {
        info!("查询 IP 集合: {}", ip_set_id);
        self.client
            .get_xml(&format!("{}/{}", IPSET_PATH, ip_set_id))
            .await
    }

    /// 更新 IP 集合
    ///
    /// `ip_set.revision` 必须是最近一次读取的值，否则平台以版本过旧拒绝。
    pub async fn update(&self, ip_set: &IpSet) -> Result<()> {
        ip_set.validate()?;
        info!(
            "更新 IP 集合: {} (revision={:?})",
            ip_set.id, ip_set.revision
        );
        self.client
            .put_xml(&format!("{}/{}", IPSET_PATH, ip_set.id), ip_set)
            .await
    }

    pub async fn delete(&self, ip_set_id: &str) -> Result<()> {
        info!("删除 IP 集合: {}", ip_set_id);
        self.client
            .delete(&format!("{}/{}", IPSET_PATH, ip_set_id))
            .await
    }
}
