//! 单个边缘网关的 API 入口
//!
//! 防火墙、负载均衡、NAT 的方法分别在同级模块中实现。

use crate::client::EdgeClient;

/// 边缘网关 API
pub struct EdgeGatewayApi<'a> {
    pub(crate) client: &'a EdgeClient,
    edge_id: String,
}

impl<'a> EdgeGatewayApi<'a> {
    /// 创建新的边缘网关 API 实例
    pub(crate) fn new(client: &'a EdgeClient, edge_id: &str) -> Self {
        Self {
            client,
            edge_id: edge_id.to_string(),
        }
    }

    pub fn edge_id(&self) -> &str {
        &self.edge_id
    }

    /// 拼接边缘网关下的接口路径
    pub(crate) fn path(&self, suffix: &str) -> String {
        format!("/network/edges/{}{}", self.edge_id, suffix)
    }
}
