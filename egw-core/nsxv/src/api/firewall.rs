//! 防火墙 API

use tracing::info;

use super::edge::EdgeGatewayApi;
use crate::error::Result;
use crate::models::{FirewallConfig, FirewallRule, FirewallRules};

const FIREWALL_CONFIG_PATH: &str = "/firewall/config";
const FIREWALL_RULES_PATH: &str = "/firewall/config/rules";

impl<'a> EdgeGatewayApi<'a> {
    /// 读取防火墙整体配置
    pub async fn get_firewall_config(&self) -> Result<FirewallConfig> {
        info!("读取防火墙配置: {}", self.edge_id());
        self.client.get_xml(&self.path(FIREWALL_CONFIG_PATH)).await
    }

    /// 提交防火墙整体配置
    ///
    /// `config` 应来自 [`get_firewall_config`](Self::get_firewall_config)，
    /// 其中的规则片段和版本号会原样发回。
    pub async fn update_firewall_config(&self, config: &FirewallConfig) -> Result<()> {
        info!(
            "更新防火墙配置: {} (version={})",
            self.edge_id(),
            config.version
        );
        self.client
            .put_xml(&self.path(FIREWALL_CONFIG_PATH), config)
            .await
    }

    /// 启用/禁用防火墙，保留现有规则
    pub async fn set_firewall_enabled(&self, enabled: bool) -> Result<FirewallConfig> {
        let mut config = self.get_firewall_config().await?;
        config.enabled = enabled;
        self.update_firewall_config(&config).await?;
        Ok(config)
    }

    /// 创建防火墙规则，返回规则 ID
    pub async fn create_firewall_rule(&self, rule: &FirewallRule) -> Result<String> {
        rule.validate()?;
        info!("创建防火墙规则: {} -> {}", self.edge_id(), rule.name);
        let request = FirewallRules {
            rules: vec![rule.clone()],
        };
        self.client
            .post_xml(&self.path(FIREWALL_RULES_PATH), &request)
            .await
    }

    pub async fn get_firewall_rule(&self, rule_id: &str) -> Result<FirewallRule> {
        info!("查询防火墙规则: {} -> {}", self.edge_id(), rule_id);
        self.client
            .get_xml(&self.path(&format!("{}/{}", FIREWALL_RULES_PATH, rule_id)))
            .await
    }

    pub async fn update_firewall_rule(&self, rule: &FirewallRule) -> Result<()> {
        rule.validate()?;
        info!("更新防火墙规则: {} -> {}", self.edge_id(), rule.id);
        self.client
            .put_xml(&self.path(&format!("{}/{}", FIREWALL_RULES_PATH, rule.id)), rule)
            .await
    }

    pub async fn delete_firewall_rule(&self, rule_id: &str) -> Result<()> {
        info!("删除防火墙规则: {} -> {}", self.edge_id(), rule_id);
        self.client
            .delete(&self.path(&format!("{}/{}", FIREWALL_RULES_PATH, rule_id)))
            .await
    }
}
