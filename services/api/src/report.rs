use crate::infra::{build_service, load_rule_table, parse_concern};
use clap::Args;
use serde::Serialize;
use skin_advisor::config::AppConfig;
use skin_advisor::error::AppError;
use skin_advisor::recommendation::{
    ConcernObservation, Language, RecommendationRequest, RecommendedIngredient, RuleTable,
};

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// Concern as TYPE=SCORE, e.g. dehydration=0.6 (repeatable)
    #[arg(long = "concern", value_parser = parse_concern)]
    pub(crate) concerns: Vec<ConcernObservation>,
    /// Display language tag (en, ko, ja, zh); defaults to ADVISOR_DEFAULT_LANGUAGE
    #[arg(long)]
    pub(crate) language: Option<String>,
    /// Maximum number of ingredients; defaults to ADVISOR_MAX_RESULTS
    #[arg(long)]
    pub(crate) max_results: Option<usize>,
    /// Emit JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RulesArgs {
    /// Emit the rule table as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize)]
struct RecommendationOutput<'a> {
    language: Language,
    fallback: bool,
    recommended_ingredients: &'a [RecommendedIngredient],
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let RecommendArgs {
        concerns,
        language,
        max_results,
        json,
    } = args;

    let config = AppConfig::load()?;
    let service = build_service(&config.advisor)?;

    let max_results = max_results
        .map(|value| {
            i64::try_from(value)
                .map_err(|_| AppError::Usage(format!("--max-results {value} is too large")))
        })
        .transpose()?;
    let request = RecommendationRequest {
        concerns,
        language: language.as_deref().map(Language::from_tag),
        max_results,
    };
    let language = request.language.unwrap_or(service.defaults().language);
    let report = service.recommend(&request);

    if json {
        let output = RecommendationOutput {
            language,
            fallback: report.fallback,
            recommended_ingredients: &report.recommended_ingredients,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let rendered = render_recommendations(&report.recommended_ingredients, report.fallback);
        println!("{rendered}");
    }

    Ok(())
}

pub(crate) fn run_rules(args: RulesArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let table = load_rule_table(&config.advisor)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(table.document())?);
    } else {
        println!("{}", render_rules(&table));
    }

    Ok(())
}

fn render_recommendations(items: &[RecommendedIngredient], fallback: bool) -> String {
    let mut out = String::new();
    if fallback {
        out.push_str("No significant concerns detected; showing maintenance care.\n");
    }
    if items.is_empty() {
        out.push_str("No ingredients matched.");
        return out;
    }

    for item in items {
        let concerns: Vec<&str> = item
            .concerns_addressed
            .iter()
            .map(|concern| concern.as_str())
            .collect();
        out.push_str(&format!(
            "{}. {} ({:.2}) [{}]\n   {}\n",
            item.rank,
            item.localized_name,
            item.normalized_score,
            concerns.join(", "),
            item.rationale
        ));
    }
    out.trim_end().to_string()
}

fn render_rules(table: &RuleTable) -> String {
    let mut out = format!("Rule table version {}\n", table.version());

    for concern in table.concerns() {
        match concern.known() {
            Some(kind) => out.push_str(&format!("\n{} ({concern})\n", kind.label())),
            None => out.push_str(&format!("\n{concern}\n")),
        }
        for rule in table.rules_for(concern) {
            out.push_str(&format!("  P{} {}\n", rule.priority, rule.canonical_name));
        }
    }

    if !table.bonuses().is_empty() {
        out.push_str("\nSynergy bonuses\n");
        for bonus in table.bonuses() {
            out.push_str(&format!(
                "  {} -> {}\n",
                bonus.concerns,
                bonus.ingredients.join(", ")
            ));
        }
    }

    out.trim_end().to_string()
}
