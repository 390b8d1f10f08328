use buddies_common::recommender::ExplainedRestaurant;
use buddies_common::{AnswerSheet, Recommender, Scorer};
use buddies_recommend::{catalog, cli, config, error, export, input, questionnaire};
use clap::Parser;
use cli::{Cli, Commands, RecommendArgs};
use config::Config;
use error::{BuddiesError, Result};
use export::{Mode, RecommendationReport};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| BuddiesError::Config(e.to_string()))?;

    let config = Config::load()?;

    match cli.command {
        Commands::Recommend { answers, answers_file, common } => {
            println!("🍜 buddies - 單人推薦\n");

            let answers = match (answers, answers_file) {
                (Some(list), _) => input::parse_answer_list(&list),
                (None, Some(path)) => input::load_answers_file(&path)?,
                (None, None) => {
                    return Err(BuddiesError::InvalidAnswers(
                        "請指定 --answers 或 --answers-file".into(),
                    ))
                }
            };
            println!("- 答案: {}", answers.join(", "));

            let tags = config.load_tag_tables()?;
            let bank = config.load_question_bank()?;
            let recommender = Recommender::new(Scorer::new(config.weights.clone(), &tags), &bank);

            let catalog = load_catalog(&common)?;
            let options = common.to_options(&config)?;
            let results =
                recommender.explain_for_individual(&answers, &catalog.restaurants, &options);

            present(results, &common, &catalog, Mode::Individual)?;
        }

        Commands::Group { members, common } => {
            println!("👥 buddies - 群組推薦\n");

            let members = input::load_members_file(&members)?;
            println!("- 成員: {}人", members.len());

            let tags = config.load_tag_tables()?;
            let bank = config.load_question_bank()?;
            let recommender = Recommender::new(Scorer::new(config.weights.clone(), &tags), &bank);

            let catalog = load_catalog(&common)?;
            let options = common.to_options(&config)?;
            let results = recommender.explain_for_group(&members, &catalog.restaurants, &options);

            present(results, &common, &catalog, Mode::Group)?;
        }

        Commands::Ask { common } => {
            println!("🍜 buddies - 問卷\n");

            let tags = config.load_tag_tables()?;
            let bank = config.load_question_bank()?;
            let recommender = Recommender::new(Scorer::new(config.weights.clone(), &tags), &bank);

            // 先讀清單，路徑錯誤時不必作答
            let catalog = load_catalog(&common)?;
            let sheet: AnswerSheet = questionnaire::run_questionnaire(&bank)?;
            let options = common.to_options(&config)?;
            let results = recommender.explain_sheet(&sheet, &catalog.restaurants, &options);

            present(results, &common, &catalog, Mode::Individual)?;
        }

        Commands::Tags { fun } => {
            let tags = config.load_tag_tables()?;
            let (title, table) = if fun {
                ("趣味題", &tags.fun)
            } else {
                ("基本題", &tags.basic)
            };

            println!("{}標籤對照表 ({}項)", title, table.len());
            for (answer, synonyms) in table {
                println!("  {} → {}", answer, synonyms.join("、"));
            }
        }

        Commands::Config { show, init } => {
            if init {
                let path = Config::config_path()?;
                if path.exists() {
                    println!("設定檔已存在: {}", path.display());
                } else {
                    let path = Config::default().save()?;
                    println!("✔ 已建立設定檔: {}", path.display());
                }
            }

            if show || !init {
                let path = Config::config_path()?;
                println!("設定檔: {}", path.display());
                println!("  嚴格模式: {}", if config.strict_basic_match { "開" } else { "關" });
                println!(
                    "  分數門檻: {}",
                    config
                        .min_score_threshold
                        .unwrap_or_else(|| config.weights.default_threshold())
                );
                println!("  退回筆數: {}", config.fallback_limit);
                match config.default_location {
                    Some(p) => println!("  預設位置: {}, {}", p.lat, p.lng),
                    None => println!("  預設位置: 未設定"),
                }
                println!(
                    "  標籤對照表: {}",
                    config
                        .tag_tables
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "內建".into())
                );
                println!(
                    "  題庫: {}",
                    config
                        .question_bank
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "內建".into())
                );
                println!("  權重:\n{}", serde_json::to_string_pretty(&config.weights)?);
            }
        }
    }

    Ok(())
}

fn load_catalog(args: &RecommendArgs) -> Result<catalog::Catalog> {
    let catalog = catalog::load_catalog(&args.catalog)?;
    println!("✔ 讀取 {} 間餐廳（{}個檔案）", catalog.len(), catalog.sources.len());
    debug!(digest = %catalog.digest, "catalog digest");
    Ok(catalog)
}

fn present(
    results: Vec<ExplainedRestaurant>,
    args: &RecommendArgs,
    catalog: &catalog::Catalog,
    mode: Mode,
) -> Result<()> {
    let mut report = RecommendationReport::new(mode, &catalog.digest, results, args.explain);
    report.truncate(args.top);

    if report.results.is_empty() {
        println!("\n沒有符合條件的餐廳");
    } else {
        println!("\n推薦結果（前{}名）", report.count);
    }

    for entry in &report.results {
        let r = &entry.scored.restaurant;
        println!(
            "{:>3}. {}  {:.2}分  [{}]",
            entry.rank,
            r.name,
            entry.scored.match_score,
            r.tags.join("、")
        );
        if let Some(b) = &entry.breakdown {
            println!(
                "      基本 {:.1} / 趣味 {:.1} / 共識 {:.1} / 評分 {:.1} / 人氣 {:.1} / 距離 {:.1} / 全中 {:.1}  (命中 {}/{})",
                b.basic,
                b.fun,
                b.consensus,
                b.rating,
                b.popularity,
                b.distance,
                b.completeness,
                b.matched,
                b.considered
            );
            if let Some(d) = b.distance_km {
                println!("      距離 {:.2} km", d);
            }
            if let Some(exit) = &b.early_exit {
                println!("      提早結束: {:?}", exit);
            }
        }
    }

    if let Some(format) = &args.format {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| std::path::PathBuf::from("."));
        for path in export::export_report(&report, format, &output, "推薦結果")? {
            println!("✔ 匯出: {}", path.display());
        }
    }

    Ok(())
}
