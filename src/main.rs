//! kashi-search terminal front-end
//!
//! Thin renderer over [`SearchSession`]: one automatic empty-query cycle at
//! startup, then a line-based loop. Plain text resubmits; `:select N` opens
//! a result, `:back` dismisses it, `:quit` exits.

use std::io::Write;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use kashi_search::view::{AccordionHeader, ResultArea, ViewState};
use kashi_search::{FilterClient, SearchClient, SearchSession};

const HELP_TEXT: &str = "この歌詞検索エンジンは生成AIを活用することによって、キーワード検索を超えた、\
「嬉しくて懐かしい」や「悲しい失恋」、「海に関連する」といった自然言語によるセマンティック検索を\
行うことができます。関連する結果に優先順位をつけ、おすすめの曲を教えてくれます。";

#[derive(Parser, Debug)]
#[command(
    name = "kashi-search",
    version,
    about = "AI lyric search - semantic song search over natural-language queries"
)]
struct Args {
    /// Base URL of the filter/search collaborator services
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let base_url = kashi_search::config::resolve_base_url(args.base_url.as_deref());

    let session = SearchSession::new(
        FilterClient::new(&base_url)?,
        SearchClient::new(&base_url)?,
    );

    // Exactly one automatic cycle with the initial (empty) query, so state
    // is warm before the first user submission
    session.submit(false).await.await?;
    render(&session.view().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => {}
            ":quit" | ":q" => break,
            ":help" => println!("{HELP_TEXT}"),
            ":back" => session.clear_selection().await,
            _ => {
                if let Some(rest) = input.strip_prefix(":select") {
                    match rest.trim().parse::<usize>() {
                        Ok(index) => session.select(index).await,
                        Err(_) => println!("usage: :select <index>"),
                    }
                } else {
                    session.set_query(input).await;
                    session.submit(true).await.await?;
                }
            }
        }
        render(&session.view().await);
        prompt();
    }

    Ok(())
}

fn render(view: &ViewState) {
    println!();

    if view.input_only {
        println!("AI 歌詞検索 — 文章を入力して検索する (:help でヘルプ)");
        return;
    }

    if let Some(detail) = &view.detail {
        println!("{} — {}", detail.title, detail.artist);
        println!("{}", detail.image_url);
        for paragraph in &detail.paragraphs {
            println!();
            println!("{paragraph}");
        }
        println!();
        println!("(:back で一覧に戻る)");
        return;
    }

    if let Some(accordion) = &view.accordion {
        match accordion.header {
            AccordionHeader::Building => {
                println!("[..] あなたの入力文に基づいたフィルタを作成しています...");
            }
            AccordionHeader::Done => {
                println!("[ok] フィルタの作成が完了しました！");
            }
        }
        if let Some(insights) = &accordion.insights {
            println!("     {insights}");
        }
    }

    match &view.results {
        ResultArea::Hidden => {}
        ResultArea::Loading => println!("ロード中..."),
        ResultArea::Grid(cards) => {
            if cards.is_empty() {
                println!("(結果なし)");
            }
            for (index, card) in cards.iter().enumerate() {
                println!("  [{index}] {} — {}", card.title, card.artist);
            }
        }
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
