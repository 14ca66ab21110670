use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{
    CombinationBonusRule, ConcernPair, ConcernType, IngredientRule, Language, LocalizedText,
    SkinConcern,
};

pub const STANDARD_RULES_VERSION: &str = "2025.1";

const MIN_PRIORITY: u8 = 1;
const MAX_PRIORITY: u8 = 5;

/// Validation failures raised while assembling a rule table.
#[derive(Debug, thiserror::Error)]
pub enum RuleTableError {
    #[error("rule '{ingredient}' under '{concern}' has priority {priority}, expected 1..=5")]
    PriorityOutOfRange {
        concern: ConcernType,
        ingredient: String,
        priority: u8,
    },
    #[error("ingredient '{ingredient}' appears twice under '{concern}'")]
    DuplicateIngredient {
        concern: ConcernType,
        ingredient: String,
    },
    #[error("priority {priority} is used twice under '{concern}'")]
    DuplicatePriority { concern: ConcernType, priority: u8 },
    #[error("rule '{ingredient}' under '{concern}' is missing English {field}")]
    MissingEnglish {
        concern: ConcernType,
        ingredient: String,
        field: &'static str,
    },
    #[error("combination bonus must pair two distinct concerns, got {0}")]
    DegenerateBonusPair(ConcernPair),
    #[error("combination bonus {0} is declared more than once")]
    DuplicateBonusPair(ConcernPair),
    #[error("failed to read rule table: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode rule table: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Serialized shape of a rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTableDocument {
    pub version: String,
    pub buckets: BTreeMap<ConcernType, Vec<IngredientRule>>,
    #[serde(default)]
    pub bonuses: Vec<CombinationBonusRule>,
}

/// Immutable lookup from concern to candidate ingredients plus the synergy table.
///
/// Built once at start-up and shared read-only (usually behind an `Arc`).
#[derive(Debug, Clone)]
pub struct RuleTable {
    document: RuleTableDocument,
    bonus_index: HashMap<ConcernPair, Vec<String>>,
}

impl RuleTable {
    pub fn new(
        version: impl Into<String>,
        buckets: BTreeMap<ConcernType, Vec<IngredientRule>>,
        bonuses: Vec<CombinationBonusRule>,
    ) -> Result<Self, RuleTableError> {
        Self::from_document(RuleTableDocument {
            version: version.into(),
            buckets,
            bonuses,
        })
    }

    pub fn from_document(document: RuleTableDocument) -> Result<Self, RuleTableError> {
        validate(&document)?;
        Ok(Self::assemble(document))
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, RuleTableError> {
        let document: RuleTableDocument = serde_json::from_reader(reader)?;
        Self::from_document(document)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RuleTableError> {
        let file = File::open(path)?;
        Self::from_json_reader(BufReader::new(file))
    }

    /// Rules for a concern ordered by ascending priority; empty for unknown concerns.
    pub fn rules_for(&self, concern: &ConcernType) -> &[IngredientRule] {
        self.document
            .buckets
            .get(concern)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Ingredients boosted when both concerns are significant. Argument order is irrelevant.
    pub fn bonus_for(&self, a: &ConcernType, b: &ConcernType) -> &[String] {
        self.bonus_index
            .get(&ConcernPair::new(a.clone(), b.clone()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn version(&self) -> &str {
        &self.document.version
    }

    pub fn concerns(&self) -> impl Iterator<Item = &ConcernType> {
        self.document.buckets.keys()
    }

    pub fn bonuses(&self) -> &[CombinationBonusRule] {
        &self.document.bonuses
    }

    pub fn document(&self) -> &RuleTableDocument {
        &self.document
    }

    pub fn validate(&self) -> Result<(), RuleTableError> {
        validate(&self.document)
    }

    fn assemble(mut document: RuleTableDocument) -> Self {
        for rules in document.buckets.values_mut() {
            rules.sort_by_key(|rule| rule.priority);
        }

        let mut bonus_index: HashMap<ConcernPair, Vec<String>> = HashMap::new();
        for bonus in &document.bonuses {
            let boosted = bonus_index.entry(bonus.concerns.clone()).or_default();
            for ingredient in &bonus.ingredients {
                if !boosted.contains(ingredient) {
                    boosted.push(ingredient.clone());
                }
            }
        }

        Self {
            document,
            bonus_index,
        }
    }

    /// Built-in table shipped with the service.
    pub fn standard() -> Self {
        Self::assemble(RuleTableDocument {
            version: STANDARD_RULES_VERSION.to_string(),
            buckets: standard_buckets(),
            bonuses: standard_bonuses(),
        })
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn validate(document: &RuleTableDocument) -> Result<(), RuleTableError> {
    for (concern, rules) in &document.buckets {
        let mut names = HashSet::new();
        let mut priorities = HashSet::new();

        for rule in rules {
            if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&rule.priority) {
                return Err(RuleTableError::PriorityOutOfRange {
                    concern: concern.clone(),
                    ingredient: rule.canonical_name.clone(),
                    priority: rule.priority,
                });
            }
            if !names.insert(rule.canonical_name.as_str()) {
                return Err(RuleTableError::DuplicateIngredient {
                    concern: concern.clone(),
                    ingredient: rule.canonical_name.clone(),
                });
            }
            if !priorities.insert(rule.priority) {
                return Err(RuleTableError::DuplicatePriority {
                    concern: concern.clone(),
                    priority: rule.priority,
                });
            }
            for (field, text) in [
                ("name", &rule.localized_names),
                ("rationale", &rule.rationale),
            ] {
                if text.en.trim().is_empty() {
                    return Err(RuleTableError::MissingEnglish {
                        concern: concern.clone(),
                        ingredient: rule.canonical_name.clone(),
                        field,
                    });
                }
            }
        }
    }

    let mut pairs = HashSet::new();
    for bonus in &document.bonuses {
        if bonus.concerns.is_degenerate() {
            return Err(RuleTableError::DegenerateBonusPair(bonus.concerns.clone()));
        }
        if !pairs.insert(&bonus.concerns) {
            return Err(RuleTableError::DuplicateBonusPair(bonus.concerns.clone()));
        }
    }

    Ok(())
}

fn rule(
    names: LocalizedText,
    priority: u8,
    concerns: &[SkinConcern],
    rationale: LocalizedText,
) -> IngredientRule {
    IngredientRule {
        canonical_name: names.en.clone(),
        localized_names: names,
        priority,
        concerns_addressed: concerns.iter().copied().map(ConcernType::from).collect(),
        rationale,
    }
}

fn name(en: &str, ko: &str) -> LocalizedText {
    LocalizedText::english(en).with(Language::Ko, ko)
}

fn why(en: &str, ko: &str) -> LocalizedText {
    LocalizedText::english(en).with(Language::Ko, ko)
}

pub(crate) fn hyaluronic_acid_name() -> LocalizedText {
    name("Hyaluronic Acid", "히알루론산")
        .with(Language::Ja, "ヒアルロン酸")
        .with(Language::Zh, "透明质酸")
}

pub(crate) fn niacinamide_name() -> LocalizedText {
    name("Niacinamide", "나이아신아마이드")
}

pub(crate) fn vitamin_c_name() -> LocalizedText {
    name("Vitamin C", "비타민C")
}

fn bha_name() -> LocalizedText {
    name("BHA (Salicylic Acid)", "BHA (살리실산)")
}

fn centella_name() -> LocalizedText {
    name("Centella Asiatica", "병풀 (시카)")
}

fn tea_tree_name() -> LocalizedText {
    name("Tea Tree Oil", "티트리 오일")
}

fn standard_buckets() -> BTreeMap<ConcernType, Vec<IngredientRule>> {
    use SkinConcern::*;

    let mut buckets = BTreeMap::new();

    buckets.insert(
        Dehydration.into(),
        vec![
            rule(
                hyaluronic_acid_name(),
                1,
                &[Dehydration, FineLines],
                why(
                    "Holds up to 1000x its weight in water, providing intense hydration and plumping dehydrated skin",
                    "자체 무게의 1000배까지 수분을 보유하여 강력한 보습 효과 제공",
                ),
            ),
            rule(
                name("Glycerin", "글리세린"),
                2,
                &[Dehydration],
                why(
                    "Attracts moisture from the air and deeper skin layers, maintaining long-lasting hydration",
                    "공기와 피부 깊은 층에서 수분을 끌어당겨 지속적인 보습 유지",
                ),
            ),
            rule(
                name("Ceramide", "세라마이드"),
                3,
                &[Dehydration, RednessSensitivity],
                why(
                    "Strengthens skin barrier to prevent moisture loss and protect against irritation",
                    "피부 장벽 강화로 수분 손실 방지 및 자극으로부터 보호",
                ),
            ),
        ],
    );

    buckets.insert(
        FineLines.into(),
        vec![
            rule(
                name("Retinol", "레티놀"),
                1,
                &[FineLines, Hyperpigmentation],
                why(
                    "Boosts collagen production and accelerates cell turnover to reduce wrinkles",
                    "콜라겐 생성 촉진 및 세포 재생 가속화로 주름 개선",
                ),
            ),
            rule(
                name("Peptides", "펩타이드"),
                2,
                &[FineLines],
                why(
                    "Signals skin to produce more collagen, improving firmness and elasticity",
                    "콜라겐 생성 신호 전달로 탄력과 유연성 개선",
                ),
            ),
            rule(
                name("Adenosine", "아데노신"),
                3,
                &[FineLines],
                why(
                    "Korean anti-aging powerhouse that smooths fine lines and boosts skin energy",
                    "K-뷰티 안티에이징 성분으로 잔주름 완화 및 피부 에너지 증진",
                ),
            ),
        ],
    );

    buckets.insert(
        Hyperpigmentation.into(),
        vec![
            rule(
                vitamin_c_name(),
                1,
                &[Hyperpigmentation, Dullness],
                why(
                    "Fades dark spots, brightens skin tone, and provides antioxidant protection",
                    "다크 스팟 완화, 피부 톤 개선, 항산화 보호 제공",
                ),
            ),
            rule(
                niacinamide_name(),
                2,
                &[Hyperpigmentation, EnlargedPores, OilySkin],
                why(
                    "Multi-tasking ingredient that brightens, minimizes pores, and controls oil",
                    "미백, 모공 축소, 피지 조절의 다기능 성분",
                ),
            ),
            rule(
                name("Alpha Arbutin", "알파 알부틴"),
                3,
                &[Hyperpigmentation],
                why(
                    "Gentle brightening agent that inhibits melanin production without irritation",
                    "자극 없이 멜라닌 생성을 억제하는 순한 미백 성분",
                ),
            ),
        ],
    );

    buckets.insert(
        EnlargedPores.into(),
        vec![
            rule(
                niacinamide_name(),
                1,
                &[EnlargedPores, OilySkin, Hyperpigmentation],
                why(
                    "Regulates sebum and refines pore appearance for smoother texture",
                    "피지 조절 및 모공 축소로 매끈한 피부 결 개선",
                ),
            ),
            rule(
                bha_name(),
                2,
                &[EnlargedPores, AcneProne, OilySkin],
                why(
                    "Oil-soluble exfoliant that unclogs pores and prevents blackheads",
                    "유용성 각질 제거제로 모공 청소 및 블랙헤드 예방",
                ),
            ),
        ],
    );

    buckets.insert(
        AcneProne.into(),
        vec![
            rule(
                tea_tree_name(),
                1,
                &[AcneProne],
                why(
                    "Natural antibacterial that fights acne-causing bacteria and reduces inflammation",
                    "천연 항균 성분으로 여드름균 억제 및 염증 완화",
                ),
            ),
            rule(
                centella_name(),
                2,
                &[AcneProne, RednessSensitivity],
                why(
                    "Korean healing herb that soothes breakouts and repairs damaged skin",
                    "K-뷰티 대표 진정 성분으로 여드름 진정 및 손상 피부 회복",
                ),
            ),
            rule(
                bha_name(),
                3,
                &[AcneProne, EnlargedPores],
                why(
                    "Penetrates pores to dissolve buildup and prevent new breakouts",
                    "모공 깊숙이 침투하여 각질 용해 및 여드름 예방",
                ),
            ),
        ],
    );

    buckets.insert(
        RednessSensitivity.into(),
        vec![
            rule(
                centella_name(),
                1,
                &[RednessSensitivity, AcneProne],
                why(
                    "Calms irritation, reduces redness, and strengthens sensitive skin barrier",
                    "자극 진정, 붉은기 완화, 민감 피부 장벽 강화",
                ),
            ),
            rule(
                name("Panthenol (Pro-Vitamin B5)", "판테놀"),
                2,
                &[RednessSensitivity, Dehydration],
                why(
                    "Deeply moisturizes and soothes irritated, reactive skin",
                    "깊은 보습 제공 및 자극받은 피부 진정",
                ),
            ),
            rule(
                name("Madecassoside", "마데카소사이드"),
                3,
                &[RednessSensitivity],
                why(
                    "Centella derivative with enhanced calming and healing properties",
                    "병풀 유래 성분으로 강화된 진정 및 회복 효과",
                ),
            ),
        ],
    );

    buckets.insert(
        Dullness.into(),
        vec![
            rule(
                vitamin_c_name(),
                1,
                &[Dullness, Hyperpigmentation],
                why(
                    "Brightens complexion and boosts radiance with powerful antioxidants",
                    "강력한 항산화 효과로 피부 톤 개선 및 광채 부여",
                ),
            ),
            rule(
                name("AHA (Glycolic Acid)", "AHA (글리콜산)"),
                2,
                &[Dullness],
                why(
                    "Exfoliates dead skin cells to reveal fresh, glowing skin underneath",
                    "각질 제거로 맑고 빛나는 피부 노출",
                ),
            ),
            rule(
                niacinamide_name(),
                3,
                &[Dullness, Hyperpigmentation],
                why(
                    "Evens skin tone and enhances natural radiance",
                    "피부 톤 균일화 및 자연스러운 광채 강화",
                ),
            ),
        ],
    );

    buckets.insert(
        OilySkin.into(),
        vec![
            rule(
                niacinamide_name(),
                1,
                &[OilySkin, EnlargedPores],
                why(
                    "Regulates sebum production without stripping skin",
                    "피부를 건조하게 만들지 않으면서 피지 분비 조절",
                ),
            ),
            rule(
                bha_name(),
                2,
                &[OilySkin, AcneProne, EnlargedPores],
                why(
                    "Controls oil, unclogs pores, and prevents shine",
                    "유분 조절, 모공 청소, 번들거림 방지",
                ),
            ),
            rule(
                tea_tree_name(),
                3,
                &[OilySkin, AcneProne],
                why(
                    "Balances oil production with natural astringent properties",
                    "천연 수렴 효과로 피지 분비 균형 조절",
                ),
            ),
        ],
    );

    buckets
}

fn standard_bonuses() -> Vec<CombinationBonusRule> {
    use SkinConcern::*;

    let bonus = |a: SkinConcern, b: SkinConcern, ingredients: &[&str]| CombinationBonusRule {
        concerns: ConcernPair::new(a, b),
        ingredients: ingredients.iter().map(|name| name.to_string()).collect(),
    };

    vec![
        bonus(Dehydration, FineLines, &["Hyaluronic Acid", "Peptides"]),
        bonus(
            AcneProne,
            Hyperpigmentation,
            &["Niacinamide", "Centella Asiatica"],
        ),
        bonus(
            OilySkin,
            EnlargedPores,
            &["Niacinamide", "BHA (Salicylic Acid)"],
        ),
        bonus(
            RednessSensitivity,
            Dehydration,
            &[
                "Centella Asiatica",
                "Panthenol (Pro-Vitamin B5)",
                "Ceramide",
            ],
        ),
    ]
}
