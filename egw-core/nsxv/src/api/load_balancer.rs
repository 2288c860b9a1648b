//! 负载均衡 API
//!
//! 整体配置接口需要携带所有组件，单个组件则有各自的增删改查接口。

use tracing::info;

use super::edge::EdgeGatewayApi;
use crate::error::Result;
use crate::models::{
    LbAppProfile, LbAppRule, LbLogging, LbMonitor, LbPool, LbVirtualServer, LoadBalancerConfig,
};

const LB_CONFIG_PATH: &str = "/loadbalancer/config";
const LB_MONITOR_PATH: &str = "/loadbalancer/config/monitors";
const LB_POOL_PATH: &str = "/loadbalancer/config/pools";
const LB_APP_PROFILE_PATH: &str = "/loadbalancer/config/applicationprofiles";
const LB_APP_RULE_PATH: &str = "/loadbalancer/config/applicationrules";
const LB_VIRTUAL_SERVER_PATH: &str = "/loadbalancer/config/virtualservers";

impl<'a> EdgeGatewayApi<'a> {
    // ============================================
    // 整体配置
    // ============================================

    /// 读取负载均衡整体配置
    pub async fn get_load_balancer_config(&self) -> Result<LoadBalancerConfig> {
        info!("读取负载均衡配置: {}", self.edge_id());
        self.client.get_xml(&self.path(LB_CONFIG_PATH)).await
    }

    /// 提交负载均衡整体配置
    ///
    /// 未建模的组件以片段形式原样发回，版本号用于平台检测并发修改。
    pub async fn update_load_balancer_config(&self, config: &LoadBalancerConfig) -> Result<()> {
        info!(
            "更新负载均衡配置: {} (version={}, pools={}, virtualServers={})",
            self.edge_id(),
            config.version,
            config.pools.len(),
            config.virtual_servers.len()
        );
        self.client.put_xml(&self.path(LB_CONFIG_PATH), config).await
    }

    /// 修改负载均衡全局开关，保留所有组件
    pub async fn set_load_balancer_enabled(
        &self,
        enabled: bool,
        acceleration_enabled: bool,
        logging: Option<LbLogging>,
    ) -> Result<LoadBalancerConfig> {
        let mut config = self.get_load_balancer_config().await?;
        config.enabled = enabled;
        config.acceleration_enabled = acceleration_enabled;
        if logging.is_some() {
            config.logging = logging;
        }
        self.update_load_balancer_config(&config).await?;
        Ok(config)
    }

    // ============================================
    // 监控器
    // ============================================

    pub async fn create_lb_monitor(&self, monitor: &LbMonitor) -> Result<String> {
        monitor.validate()?;
        info!("创建负载均衡监控器: {} -> {}", self.edge_id(), monitor.name);
        self.client.post_xml(&self.path(LB_MONITOR_PATH), monitor).await
    }

    pub async fn get_lb_monitor(&self, monitor_id: &str) -> Result<LbMonitor> {
        info!("查询负载均衡监控器: {} -> {}", self.edge_id(), monitor_id);
        self.client
            .get_xml(&self.path(&format!("{}/{}", LB_MONITOR_PATH, monitor_id)))
            .await
    }

    pub async fn update_lb_monitor(&self, monitor: &LbMonitor) -> Result<()> {
        monitor.validate()?;
        info!("更新负载均衡监控器: {} -> {}", self.edge_id(), monitor.id);
        self.client
            .put_xml(&self.path(&format!("{}/{}", LB_MONITOR_PATH, monitor.id)), monitor)
            .await
    }

    pub async fn delete_lb_monitor(&self, monitor_id: &str) -> Result<()> {
        info!("删除负载均衡监控器: {} -> {}", self.edge_id(), monitor_id);
        self.client
            .delete(&self.path(&format!("{}/{}", LB_MONITOR_PATH, monitor_id)))
            .await
    }

    // ============================================
    // 服务器池
    // ============================================

    pub async fn create_lb_pool(&self, pool: &LbPool) -> Result<String> {
        pool.validate()?;
        info!(
            "创建负载均衡服务器池: {} -> {} ({} 个成员)",
            self.edge_id(),
            pool.name,
            pool.members.len()
        );
        self.client.post_xml(&self.path(LB_POOL_PATH), pool).await
    }

    pub async fn get_lb_pool(&self, pool_id: &str) -> Result<LbPool> {
        info!("查询负载均衡服务器池: {} -> {}", self.edge_id(), pool_id);
        self.client
            .get_xml(&self.path(&format!("{}/{}", LB_POOL_PATH, pool_id)))
            .await
    }

    pub async fn update_lb_pool(&self, pool: &LbPool) -> Result<()> {
        pool.validate()?;
        info!("更新负载均衡服务器池: {} -> {}", self.edge_id(), pool.id);
        self.client
            .put_xml(&self.path(&format!("{}/{}", LB_POOL_PATH, pool.id)), pool)
            .await
    }

    pub async fn delete_lb_pool(&self, pool_id: &str) -> Result<()> {
        info!("删除负载均衡服务器池: {} -> {}", self.edge_id(), pool_id);
        self.client
            .delete(&self.path(&format!("{}/{}", LB_POOL_PATH, pool_id)))
            .await
    }

    // ============================================
    // 应用配置
    // ============================================

    pub async fn create_lb_app_profile(&self, profile: &LbAppProfile) -> Result<String> {
        profile.validate()?;
        info!("创建负载均衡应用配置: {} -> {}", self.edge_id(), profile.name);
        self.client
            .post_xml(&self.path(LB_APP_PROFILE_PATH), profile)
            .await
    }

    pub async fn get_lb_app_profile(&self, profile_id: &str) -> Result<LbAppProfile> {
        info!("查询负载均衡应用配置: {} -> {}", self.edge_id(), profile_id);
        self.client
            .get_xml(&self.path(&format!("{}/{}", LB_APP_PROFILE_PATH, profile_id)))
            .await
    }

    pub async fn update_lb_app_profile(&self, profile: &LbAppProfile) -> Result<()> {
        profile.validate()?;
        info!("更新负载均衡应用配置: {} -> {}", self.edge_id(), profile.id);
        self.client
            .put_xml(
                &self.path(&format!("{}/{}", LB_APP_PROFILE_PATH, profile.id)),
                profile,
            )
            .await
    }

    pub async fn delete_lb_app_profile(&self, profile_id: &str) -> Result<()> {
        info!("删除负载均衡应用配置: {} -> {}", self.edge_id(), profile_id);
        self.client
            .delete(&self.path(&format!("{}/{}", LB_APP_PROFILE_PATH, profile_id)))
            .await
    }

    // ============================================
    // 应用规则
    // ============================================

    pub async fn create_lb_app_rule(&self, rule: &LbAppRule) -> Result<String> {
        rule.validate()?;
        info!("创建负载均衡应用规则: {} -> {}", self.edge_id(), rule.name);
        self.client.post_xml(&self.path(LB_APP_RULE_PATH), rule).await
    }

    pub async fn get_lb_app_rule(&self, rule_id: &str) -> Result<LbAppRule> {
        info!("查询负载均衡应用规则: {} -> {}", self.edge_id(), rule_id);
        self.client
            .get_xml(&self.path(&format!("{}/{}", LB_APP_RULE_PATH, rule_id)))
            .await
    }

    pub async fn update_lb_app_rule(&self, rule: &LbAppRule) -> Result<()> {
        rule.validate()?;
        info!("更新负载均衡应用规则: {} -> {}", self.edge_id(), rule.id);
        self.client
            .put_xml(&self.path(&format!("{}/{}", LB_APP_RULE_PATH, rule.id)), rule)
            .await
    }

    pub async fn delete_lb_app_rule(&self, rule_id: &str) -> Result<()> {
        info!("删除负载均衡应用规则: {} -> {}", self.edge_id(), rule_id);
        self.client
            .delete(&self.path(&format!("{}/{}", LB_APP_RULE_PATH, rule_id)))
            .await
    }

    // ============================================
    // 虚拟服务器
    // ============================================

    pub async fn create_lb_virtual_server(&self, server: &LbVirtualServer) -> Result<String> {
        server.validate()?;
        info!(
            "创建负载均衡虚拟服务器: {} -> {} ({}:{})",
            self.edge_id(),
            server.name,
            server.ip_address,
            server.port
        );
        self.client
            .post_xml(&self.path(LB_VIRTUAL_SERVER_PATH), server)
            .await
    }

    pub async fn get_lb_virtual_server(&self, server_id: &str) -> Result<LbVirtualServer> {
        info!("查询负载均衡虚拟服务器: {} -> {}", self.edge_id(), server_id);
        self.client
            .get_xml(&self.path(&format!("{}/{}", LB_VIRTUAL_SERVER_PATH, server_id)))
            .await
    }

    pub async fn update_lb_virtual_server(&self, server: &LbVirtualServer) -> Result<()> {
        server.validate()?;
        info!("更新负载均衡虚拟服务器: {} -> {}", self.edge_id(), server.id);
        self.client
            .put_xml(
                &self.path(&format!("{}/{}", LB_VIRTUAL_SERVER_PATH, server.id)),
                server,
            )
            .await
    }

    pub async fn delete_lb_virtual_server(&self, server_id: &str) -> Result<()> {
        info!("删除负载均衡虚拟服务器: {} -> {}", self.edge_id(), server_id);
        self.client
            .delete(&self.path(&format!("{}/{}", LB_VIRTUAL_SERVER_PATH, server_id)))
            .await
    }
}
