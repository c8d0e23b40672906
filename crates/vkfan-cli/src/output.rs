use clap::Args;
use serde_json::Value;
use tracing::info;
use vkfan::{persist, ClientConfig, ResultTree};
use vkfan_store::{DbSettings, RedbTables};

#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    /// Also store the results in this table of the result store
    #[arg(long, value_name = "TABLE")]
    pub save: Option<String>,
    /// Print JSON on a single line
    #[arg(long)]
    pub compact: bool,
}

impl OutputArgs {
    pub fn print(&self, value: &Value) -> anyhow::Result<()> {
        let text = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        println!("{text}");
        Ok(())
    }

    pub fn save_items(&self, config: &ClientConfig, table: &str, items: &[Value]) -> anyhow::Result<()> {
        let written = persist::save_items(&open_store(config)?, table, items)?;
        info!(table, rows = written, "saved results");
        Ok(())
    }

    /// Print a flat list, saving it first when `--save` was given.
    pub fn emit_items(&self, config: &ClientConfig, items: Vec<Value>) -> anyhow::Result<()> {
        if let Some(table) = &self.save {
            self.save_items(config, table, &items)?;
        }
        self.print(&Value::Array(items))
    }

    /// Print a whole result tree; `--save` is used as a table name prefix.
    pub fn emit_tree(&self, config: &ClientConfig, tree: &ResultTree) -> anyhow::Result<()> {
        if let Some(prefix) = &self.save {
            let written = persist::save_tree(&open_store(config)?, prefix, tree)?;
            info!(prefix = %prefix, rows = written, "saved result tree");
        }
        self.print(&tree.to_json())
    }
}

fn open_store(config: &ClientConfig) -> anyhow::Result<RedbTables> {
    let settings = config.store.clone().unwrap_or_else(DbSettings::default);
    Ok(RedbTables::open(&settings)?)
}
