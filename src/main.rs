use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use botguard::{
    AppState, classifier::ModelArtifact, config::Config, create_router, database::Store,
    profile::RapidApiProfileSource,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 打开本地数据库
    let store = Store::connect(&config)
        .await
        .expect("Failed to open store");

    // 加载模型
    let model = ModelArtifact::load(&config.model_path).expect("Failed to load model artifact");

    let profiles =
        RapidApiProfileSource::new(&config).expect("Failed to build profile API client");

    // 设置应用状态
    let state = AppState::new(config.clone(), store, Arc::new(model), Arc::new(profiles));
    let app = create_router(state);

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
