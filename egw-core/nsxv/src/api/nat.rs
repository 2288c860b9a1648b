//! NAT 规则 API

use tracing::info;

use super::edge::EdgeGatewayApi;
use crate::error::Result;
use crate::models::{NatRule, NatRules};

const NAT_RULES_PATH: &str = "/nat/config/rules";

impl<'a> EdgeGatewayApi<'a> {
    /// 创建 NAT 规则，返回规则 ID
    pub async fn create_nat_rule(&self, rule: &NatRule) -> Result<String> {
        rule.validate()?;
        info!(
            "创建 NAT 规则: {} -> {} {} => {}",
            self.edge_id(),
            rule.action,
            rule.original_address,
            rule.translated_address
        );
        let request = NatRules {
            rules: vec![rule.clone()],
        };
        self.client
            .post_xml(&self.path(NAT_RULES_PATH), &request)
            .await
    }

    pub async fn get_nat_rule(&self, rule_id: &str) -> Result<NatRule> {
        info!("查询 NAT 规则: {} -> {}", self.edge_id(), rule_id);
        self.client
            .get_xml(&self.path(&format!("{}/{}", NAT_RULES_PATH, rule_id)))
            .await
    }

    pub async fn update_nat_rule(&self, rule: &NatRule) -> Result<()> {
        rule.validate()?;
        info!("更新 NAT 规则: {} -> {}", self.edge_id(), rule.id);
        self.client
            .put_xml(&self.path(&format!("{}/{}", NAT_RULES_PATH, rule.id)), rule)
            .await
    }

    pub async fn delete_nat_rule(&self, rule_id: &str) -> Result<()> {
        info!("删除 NAT 规则: {} -> {}", self.edge_id(), rule_id);
        self.client
            .delete(&self.path(&format!("{}/{}", NAT_RULES_PATH, rule_id)))
            .await
    }
}
