//! `ptrack serve` command - JSON API server

use console::style;
use miette::Result;

use crate::cli::commands::utils::open_workspace;
use crate::cli::GlobalOpts;
use crate::server;

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (default: config `bind`, then 127.0.0.1:8080)
    #[arg(long, short = 'b')]
    pub bind: Option<String>,
}

pub fn run(args: ServeArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let addr = args.bind.unwrap_or_else(|| ws.config.bind().to_string());

    if !global.quiet {
        println!(
            "{} Serving {} on {}",
            style("◆").cyan(),
            style(ws.project.root().display()).dim(),
            style(format!("http://{}", addr)).cyan()
        );
        println!("  {}", style("GET/POST /api/products, /api/batches").dim());
    }

    server::serve(ws.store, &addr).map_err(|e| {
        miette::miette!(
            help = "pass --bind or set `bind` with `ptrack config set bind <addr>`",
            "{}",
            e
        )
    })
}
