/// 负载均衡开关工具
///
/// 读取边缘网关的负载均衡整体配置，切换开关后原样提交，服务器池等组件保持不变。
///
/// 使用方法:
/// ```bash
/// export EGW_BASE_URL=https://vcd.example.com
/// export EGW_TOKEN=<会话令牌>
/// export EGW_EDGE_ID=edge-3
/// cargo run -p egw-nsxv --example toggle_load_balancer -- off
/// ```

use anyhow::Context;
use egw_nsxv::{EdgeClient, EdgeConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_target(false)
        .init();

    let enabled = match std::env::args().nth(1).as_deref() {
        Some("on") => true,
        Some("off") => false,
        _ => anyhow::bail!("用法: toggle_load_balancer <on|off>"),
    };

    let base_url = std::env::var("EGW_BASE_URL").context("未设置 EGW_BASE_URL")?;
    let token = std::env::var("EGW_TOKEN").context("未设置 EGW_TOKEN")?;
    let edge_id = std::env::var("EGW_EDGE_ID").context("未设置 EGW_EDGE_ID")?;

    let mut config = EdgeConfig::default();
    config.apply_env_vars()?;

    let client = EdgeClient::new(&base_url, config)?;
    client.set_token(token).await;

    let edge = client.edge(&edge_id);
    let before = edge.get_load_balancer_config().await?;
    println!(
        "📌 当前状态: enabled={}, version={}, pools={}, virtualServers={}",
        before.enabled,
        before.version,
        before.pools.len(),
        before.virtual_servers.len()
    );

    let after = edge
        .set_load_balancer_enabled(enabled, before.acceleration_enabled, None)
        .await?;
    println!("✅ 已提交: enabled={}", after.enabled);

    Ok(())
}
