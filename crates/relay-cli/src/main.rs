//! 릴레이 대시보드 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 설정 파일로 라이브 피드 관찰
//! relay watch -c config/default.toml
//!
//! # URL/토큰 직접 지정
//! relay watch --url wss://feed.example.com/live --token $TOKEN
//!
//! # 설정 파일 검증
//! relay check -c config/default.toml
//! ```

use clap::{Parser, Subcommand};

mod commands;

use commands::check::run_check;
use commands::watch::run_watch;
use commands::load_config;

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "Relay dashboard CLI - 프록시 트래픽 라이브 모니터", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 라이브 피드에 연결해 파생 뷰를 주기적으로 출력
    Watch {
        /// 설정 파일 경로
        #[arg(short, long, default_value = "config/default.toml")]
        config: String,

        /// 피드 WebSocket URL (설정 파일 오버라이드)
        #[arg(long)]
        url: Option<String>,

        /// 접속 토큰 (설정 파일 오버라이드)
        #[arg(long)]
        token: Option<String>,

        /// 출력 간격 (초)
        #[arg(short, long, default_value = "5")]
        interval: u64,
    },

    /// 설정 파일 로드 및 검증
    Check {
        /// 설정 파일 경로
        #[arg(short, long, default_value = "config/default.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            config,
            url,
            token,
            interval,
        } => {
            let config = load_config(&config, url, token)?;
            run_watch(config, interval).await
        }
        Commands::Check { config } => run_check(&config),
    }
}
