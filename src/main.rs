// ==========================================
// 诊所储值余额系统 - 命令行入口
// ==========================================
// 输出: JSON（stdout），日志走 tracing（stderr）
// ==========================================

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use clinic_credit_balance::api::{CreateUserRequest, LoginRequest, VoucherSearchRequest};
use clinic_credit_balance::config::AppConfig;
use clinic_credit_balance::domain::{CreditBalanceFilter, NewCenter};
use clinic_credit_balance::{logging, AppState, SchemaVariant, VoucherPolicy};

#[derive(Parser, Debug)]
#[command(name = "credit-balance", version, about = "诊所储值余额台账导入与查询")]
struct Cli {
    /// 配置文件（JSON）
    #[arg(long, global = true, env = "CREDIT_BALANCE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 整表替换导入 Excel/CSV
    Import {
        file: PathBuf,
        /// legacy | communication
        #[arg(long, default_value = "legacy")]
        variant: SchemaVariant,
        /// 工作表名（默认按版式选择）
        #[arg(long)]
        sheet: Option<String>,
    },
    /// 按当前口径重算全部券号
    RefreshVouchers,
    /// 汇总统计
    Summary,
    /// 条件列表
    List {
        #[arg(long)]
        client_code: Option<String>,
        #[arg(long)]
        client_name: Option<String>,
        #[arg(long)]
        center: Option<String>,
        #[arg(long, default_value_t = 0)]
        skip: i64,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// 券号子串检索（写访问日志）
    SearchVoucher {
        voucher_id: String,
        #[arg(long, env = "USER", default_value = "cli")]
        user: String,
    },
    /// 访问日志
    Logs {
        #[arg(long)]
        user: Option<String>,
        #[arg(long, default_value_t = 0)]
        skip: i64,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// 新建中心
    AddCenter {
        #[arg(long)]
        name: String,
        #[arg(long)]
        code: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// 新建用户
    AddUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "CREDIT_BALANCE_PASSWORD")]
        password: String,
        #[arg(long)]
        full_name: String,
        #[arg(long, default_value = "USER")]
        role: String,
        #[arg(long)]
        center_id: Option<i64>,
    },
    /// 登录并输出令牌
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "CREDIT_BALANCE_PASSWORD")]
        password: String,
    },
    /// 当前用户所属中心的记录
    MyCenter {
        #[arg(long, env = "CREDIT_BALANCE_TOKEN")]
        token: String,
        #[arg(long, default_value_t = 0)]
        skip: i64,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// 切换券号口径（COLUMN_IMPORT | RECORD_METHOD）
    SetPolicy { policy: VoucherPolicy },
    /// 设置提交批大小
    SetBatchSize { batch_size: usize },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("加载配置失败")?;
    logging::init(&config.logging);

    tracing::info!(version = clinic_credit_balance::VERSION, "{}", clinic_credit_balance::APP_NAME);

    let state = AppState::new(config).context("初始化AppState失败")?;

    match cli.command {
        Command::Import {
            file,
            variant,
            sheet,
        } => {
            let report = state
                .import_api
                .import_file(&file, variant, sheet.as_deref())
                .await?;
            print_json(&report)?;
        }
        Command::RefreshVouchers => {
            print_json(&state.import_api.refresh_vouchers().await?)?;
        }
        Command::Summary => {
            print_json(&state.credit_balance_api.summary()?)?;
        }
        Command::List {
            client_code,
            client_name,
            center,
            skip,
            limit,
        } => {
            let filter = CreditBalanceFilter {
                client_code,
                client_name,
                center,
                skip,
                limit,
            };
            print_json(&state.credit_balance_api.list(&filter)?)?;
        }
        Command::SearchVoucher { voucher_id, user } => {
            let request = VoucherSearchRequest {
                voucher_id,
                user_name: user,
                ip_address: None,
                user_agent: Some(format!("credit-balance-cli/{}", clinic_credit_balance::VERSION)),
            };
            print_json(&state.credit_balance_api.search_by_voucher(&request)?)?;
        }
        Command::Logs { user, skip, limit } => {
            print_json(&state.api_log_api.list_logs(user.as_deref(), skip, limit)?)?;
        }
        Command::AddCenter {
            name,
            code,
            address,
            phone,
            email,
        } => {
            let center = NewCenter {
                name,
                code,
                address,
                phone,
                email,
                is_active: true,
            };
            print_json(&state.center_api.create_center(&center)?)?;
        }
        Command::AddUser {
            username,
            email,
            password,
            full_name,
            role,
            center_id,
        } => {
            let request = CreateUserRequest {
                username,
                email,
                password,
                full_name,
                role,
                role_id: None,
                center_id,
            };
            print_json(&state.auth_api.create_user(&request)?)?;
        }
        Command::Login { username, password } => {
            let response = state.auth_api.login(&LoginRequest { username, password })?;
            print_json(&response)?;
        }
        Command::MyCenter { token, skip, limit } => {
            print_json(&state.credit_balance_api.list_by_user_center(&token, skip, limit)?)?;
        }
        Command::SetPolicy { policy } => {
            state.import_api.set_voucher_policy(policy)?;
            print_json(&serde_json::json!({ "voucher_policy": policy }))?;
        }
        Command::SetBatchSize { batch_size } => {
            state.import_api.set_commit_batch_size(batch_size)?;
            print_json(&serde_json::json!({ "commit_batch_size": batch_size }))?;
        }
    }

    Ok(())
}
