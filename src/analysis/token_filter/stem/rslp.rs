//! RSLP (Removedor de Sufixos da Lingua Portuguesa) stemmer.
//!
//! RSLP is a rule-based suffix stripper for Portuguese. It runs a fixed
//! sequence of steps, each a list of rules tried in order:
//!
//! 1. Plural reduction (only for words ending in "s")
//! 2. Feminine reduction (only for words ending in "a")
//! 3. Adverb reduction
//! 4. Augmentative/diminutive reduction
//! 5. Noun suffix reduction; if a rule fires, stemming stops here
//! 6. Verb suffix reduction; if a rule fires, stemming stops here
//! 7. Vowel removal
//!
//! A rule `{suffix, min_stem_size, replacement, exceptions}` fires when the
//! word ends with `suffix`, the word has at least
//! `suffix.len() + min_stem_size` characters and the word is not one of the
//! exceptions. The first rule that fires ends the step.
//!
//! The rule tables are plain data ([`RslpRules`]) so they can be exported
//! with the model artifacts and loaded back by another runtime.
//!
//! # Examples
//!
//! ```
//! use intentport::analysis::token_filter::stem::Stemmer;
//! use intentport::analysis::token_filter::stem::rslp::RslpStemmer;
//!
//! let stemmer = RslpStemmer::new();
//!
//! assert_eq!(stemmer.stem("planos"), "plan");
//! assert_eq!(stemmer.stem("cotação"), "cot");
//! ```

use serde::{Deserialize, Serialize};

use crate::analysis::token_filter::stem::Stemmer;
use crate::error::{IntentportError, Result};

/// A single suffix replacement rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemRule {
    /// Suffix that must terminate the word.
    pub suffix: String,
    /// Minimum number of characters that must remain before the suffix.
    pub min_stem_size: usize,
    /// Text appended to the stem after the suffix is removed.
    #[serde(default)]
    pub replacement: String,
    /// Whole words the rule never applies to.
    #[serde(default)]
    pub exceptions: Vec<String>,
}

impl StemRule {
    /// Apply this rule to `word`, returning the rewritten word if it fires.
    fn apply(&self, word: &str, word_chars: usize) -> Option<String> {
        if !word.ends_with(self.suffix.as_str()) {
            return None;
        }
        if word_chars < self.suffix.chars().count() + self.min_stem_size {
            return None;
        }
        if self.exceptions.iter().any(|exception| exception == word) {
            return None;
        }

        let stem = &word[..word.len() - self.suffix.len()];
        Some(format!("{stem}{}", self.replacement))
    }
}

/// An ordered list of rules with an optional required word ending.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemStep {
    /// Step name.
    pub name: String,
    /// The step only runs on words ending with this text.
    #[serde(default)]
    pub required_ending: Option<String>,
    /// Rules tried in order; the first one that fires wins.
    pub rules: Vec<StemRule>,
}

type RuleRow = (&'static str, usize, &'static str, &'static [&'static str]);

impl StemStep {
    fn from_table(name: &str, required_ending: Option<&str>, table: &[RuleRow]) -> Self {
        StemStep {
            name: name.to_string(),
            required_ending: required_ending.map(str::to_string),
            rules: table
                .iter()
                .map(|(suffix, min_stem_size, replacement, exceptions)| StemRule {
                    suffix: suffix.to_string(),
                    min_stem_size: *min_stem_size,
                    replacement: replacement.to_string(),
                    exceptions: exceptions.iter().map(|e| e.to_string()).collect(),
                })
                .collect(),
        }
    }

    /// Run the step on `word`, returning the rewritten word if a rule fired.
    pub fn apply(&self, word: &str) -> Option<String> {
        if let Some(ending) = &self.required_ending {
            if !word.ends_with(ending.as_str()) {
                return None;
            }
        }

        let word_chars = word.chars().count();
        self.rules
            .iter()
            .find_map(|rule| rule.apply(word, word_chars))
    }
}

/// The complete RSLP rule set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RslpRules {
    pub plural: StemStep,
    pub feminine: StemStep,
    pub adverb: StemStep,
    pub augmentative: StemStep,
    pub noun: StemStep,
    pub verb: StemStep,
    pub vowel: StemStep,
}

impl RslpRules {
    /// Parse a rule set from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: RslpRules = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Check that no rule has an empty suffix.
    pub fn validate(&self) -> Result<()> {
        for step in self.steps() {
            if let Some(rule) = step.rules.iter().find(|rule| rule.suffix.is_empty()) {
                return Err(IntentportError::analysis(format!(
                    "stemmer step '{}' has a rule with an empty suffix (replacement '{}')",
                    step.name, rule.replacement
                )));
            }
        }
        Ok(())
    }

    /// All steps in execution order.
    pub fn steps(&self) -> [&StemStep; 7] {
        [
            &self.plural,
            &self.feminine,
            &self.adverb,
            &self.augmentative,
            &self.noun,
            &self.verb,
            &self.vowel,
        ]
    }

    /// Total number of rules across all steps.
    pub fn rule_count(&self) -> usize {
        self.steps().iter().map(|step| step.rules.len()).sum()
    }
}

impl Default for RslpRules {
    fn default() -> Self {
        RslpRules {
            plural: StemStep::from_table("plural", Some("s"), PLURAL),
            feminine: StemStep::from_table("feminine", Some("a"), FEMININE),
            adverb: StemStep::from_table("adverb", None, ADVERB),
            augmentative: StemStep::from_table("augmentative", None, AUGMENTATIVE),
            noun: StemStep::from_table("noun", None, NOUN),
            verb: StemStep::from_table("verb", None, VERB),
            vowel: StemStep::from_table("vowel", None, VOWEL),
        }
    }
}

/// Portuguese stemmer driven by [`RslpRules`].
#[derive(Clone, Debug, Default)]
pub struct RslpStemmer {
    rules: RslpRules,
}

impl RslpStemmer {
    /// Create a stemmer with the built-in rule tables.
    pub fn new() -> Self {
        RslpStemmer {
            rules: RslpRules::default(),
        }
    }

    /// Create a stemmer with custom rule tables.
    pub fn with_rules(rules: RslpRules) -> Self {
        RslpStemmer { rules }
    }

    /// The rule tables used by this stemmer.
    pub fn rules(&self) -> &RslpRules {
        &self.rules
    }
}

impl Stemmer for RslpStemmer {
    fn stem(&self, word: &str) -> String {
        let mut word = word.to_lowercase();
        if word.is_empty() {
            return word;
        }

        for step in [
            &self.rules.plural,
            &self.rules.feminine,
            &self.rules.adverb,
            &self.rules.augmentative,
        ] {
            if let Some(reduced) = step.apply(&word) {
                word = reduced;
            }
        }

        if let Some(reduced) = self.rules.noun.apply(&word) {
            return reduced;
        }
        if let Some(reduced) = self.rules.verb.apply(&word) {
            return reduced;
        }
        self.rules.vowel.apply(&word).unwrap_or(word)
    }

    fn name(&self) -> &'static str {
        "rslp"
    }
}

const PLURAL: &[RuleRow] = &[
    ("ns", 1, "m", &[]),
    ("ões", 3, "ão", &[]),
    ("ães", 1, "ão", &["mães"]),
    ("ais", 1, "al", &["cais", "mais"]),
    ("éis", 2, "el", &[]),
    ("eis", 2, "el", &[]),
    ("óis", 2, "ol", &[]),
    ("is", 2, "il", &["lápis", "cais", "mais", "crúcis", "biquínis", "pois", "depois", "dois", "leis"]),
    ("les", 3, "l", &[]),
    ("res", 3, "r", &["árvores"]),
    ("s", 2, "", &[
        "aliás", "pires", "lápis", "cais", "mais", "mas", "menos", "férias", "fezes", "pêsames",
        "crúcis", "gás", "atrás", "moisés", "através", "convés", "ês", "país", "após", "ambas",
        "ambos", "messias", "depois",
    ]),
];

const FEMININE: &[RuleRow] = &[
    ("ona", 3, "ão", &["abandona", "lona", "iona", "cortisona", "monótona", "maratona", "acetona", "detona", "carona"]),
    ("ora", 3, "or", &[]),
    ("na", 4, "no", &[
        "carona", "abandona", "lona", "iona", "cortisona", "monótona", "maratona", "acetona",
        "detona", "guiana", "campana", "grana", "caravana", "banana", "paisana",
    ]),
    ("inha", 3, "inho", &["rainha", "linha", "minha"]),
    ("esa", 3, "ês", &["mesa", "obesa", "princesa", "turquesa", "ilesa", "pesa", "presa"]),
    ("osa", 3, "oso", &["mucosa", "prosa"]),
    ("íaca", 3, "íaco", &[]),
    ("ica", 3, "ico", &["dica"]),
    ("ada", 2, "ado", &["pitada"]),
    ("ida", 3, "ido", &["vida", "dúvida"]),
    ("ída", 3, "ido", &["recaída", "saída"]),
    ("ima", 3, "imo", &["vítima"]),
    ("iva", 3, "ivo", &["saliva", "oliva"]),
    ("eira", 3, "eiro", &[
        "beira", "cadeira", "frigideira", "bandeira", "feira", "capoeira", "barreira", "fronteira",
        "besteira", "poeira",
    ]),
];

const ADVERB: &[RuleRow] = &[("mente", 4, "", &["experimente"])];

const AUGMENTATIVE: &[RuleRow] = &[
    ("díssimo", 5, "", &[]),
    ("abilíssimo", 5, "", &[]),
    ("íssimo", 3, "", &[]),
    ("ésimo", 3, "", &[]),
    ("érrimo", 4, "", &[]),
    ("zinho", 2, "", &[]),
    ("quinho", 4, "c", &[]),
    ("uinho", 4, "", &[]),
    ("adinho", 3, "", &[]),
    ("inho", 3, "", &["caminho", "cominho"]),
    ("alhão", 4, "", &[]),
    ("uça", 4, "", &[]),
    ("aço", 4, "", &["antebraço"]),
    ("aça", 4, "", &[]),
    ("adão", 4, "", &[]),
    ("idão", 4, "", &[]),
    ("ázio", 3, "", &["topázio"]),
    ("arraz", 4, "", &[]),
    ("zarrão", 3, "", &[]),
    ("arrão", 4, "", &[]),
    ("zão", 2, "", &["coalizão"]),
];

const NOUN: &[RuleRow] = &[
    ("encialista", 4, "", &[]),
    ("alista", 5, "", &[]),
    ("agem", 3, "", &["coragem", "chantagem", "vantagem", "carruagem"]),
    ("iamento", 4, "", &[]),
    ("amento", 3, "", &["firmamento", "fundamento", "departamento"]),
    ("imento", 3, "", &[]),
    ("mento", 6, "", &["firmamento", "elemento", "complemento", "instrumento", "departamento"]),
    ("alização", 5, "", &[]),
    ("atização", 5, "", &[]),
    ("tização", 5, "", &[]),
    ("ização", 5, "", &["organização"]),
    ("ação", 3, "", &["equação", "relação"]),
    ("ição", 3, "", &["eleição"]),
    ("alizado", 4, "", &[]),
    ("atizado", 4, "", &[]),
    ("tizado", 4, "", &["alfabetizado"]),
    ("izado", 5, "", &["organizado", "pulverizado"]),
    ("ativo", 4, "", &["pejorativo", "relativo"]),
    ("tivo", 4, "", &["relativo"]),
    ("ivo", 4, "", &["passivo", "possessivo", "pejorativo", "positivo"]),
    ("ado", 2, "", &["grado"]),
    ("ido", 3, "", &["cândido", "consolido", "rápido", "decido", "tímido", "duvido", "marido"]),
    ("ador", 3, "", &[]),
    ("edor", 3, "", &[]),
    ("idor", 4, "", &["ouvidor"]),
    ("dor", 4, "", &["ouvidor"]),
    ("sor", 4, "", &["assessor"]),
    ("atoria", 5, "", &[]),
    ("tor", 3, "", &["benfeitor", "leitor", "editor", "pastor", "produtor", "promotor", "consultor"]),
    ("or", 2, "", &[
        "motor", "melhor", "redor", "rigor", "sensor", "tambor", "tumor", "assessor", "benfeitor",
        "pastor", "terior", "favor", "autor",
    ]),
    ("abilidade", 5, "", &[]),
    ("icionista", 4, "", &[]),
    ("cionista", 5, "", &[]),
    ("ionista", 5, "", &[]),
    ("ionar", 5, "", &[]),
    ("ional", 4, "", &[]),
    ("ência", 3, "", &[]),
    ("ância", 4, "", &["ambulância"]),
    ("edouro", 3, "", &[]),
    ("queiro", 3, "c", &[]),
    ("adeiro", 4, "", &["desfiladeiro"]),
    ("eiro", 3, "", &["desfiladeiro", "pioneiro", "mosteiro"]),
    ("uoso", 3, "", &[]),
    ("oso", 3, "", &["precioso"]),
    ("ário", 3, "", &["voluntário", "salário", "aniversário", "diário", "lionário", "armário"]),
    ("atório", 3, "", &[]),
    ("rio", 5, "", &[
        "voluntário", "salário", "aniversário", "diário", "compulsório", "lionário", "próprio",
        "stério", "armário",
    ]),
    ("ério", 6, "", &[]),
    ("ês", 4, "", &[]),
    ("eza", 3, "", &[]),
    ("ez", 4, "", &[]),
    ("esco", 4, "", &[]),
    ("ante", 2, "", &["gigante", "elefante", "adiante", "possante", "instante", "restaurante"]),
    ("ástico", 4, "", &["eclesiástico"]),
    ("alístico", 3, "", &[]),
    ("áutico", 4, "", &[]),
    ("êutico", 4, "", &[]),
    ("tico", 3, "", &[
        "político", "eclesiástico", "diagnóstico", "prático", "doméstico", "idêntico",
        "alopático", "artístico", "autêntico", "eclético", "crítico",
    ]),
    ("ico", 4, "", &["tico", "público", "explico"]),
    ("ividade", 5, "", &[]),
    ("idade", 4, "", &["autoridade", "comunidade"]),
    ("oria", 4, "", &["categoria"]),
    ("encial", 5, "", &[]),
    ("ista", 4, "", &[]),
    ("auta", 5, "", &[]),
    ("quice", 4, "c", &[]),
    ("ice", 4, "", &["cúmplice"]),
    ("íaco", 3, "", &[]),
    ("ente", 4, "", &["freqüente", "alimente", "acrescente", "permanente", "oriente", "aparente"]),
    ("ense", 5, "", &[]),
    ("inal", 3, "", &[]),
    ("ano", 4, "", &[]),
    ("ável", 2, "", &["afável", "razoável", "potável", "vulnerável"]),
    ("ível", 3, "", &["possível"]),
    ("vel", 5, "", &["possível", "vulnerável", "solúvel"]),
    ("bil", 3, "vel", &[]),
    ("ura", 4, "", &["imatura", "acupuntura", "costura"]),
    ("ural", 4, "", &[]),
    ("ual", 3, "", &["bissexual", "virtual", "visual", "pontual"]),
    ("ial", 3, "", &[]),
    ("al", 4, "", &[
        "afinal", "animal", "estatal", "bissexual", "desleal", "fiscal", "formal", "pessoal",
        "liberal", "postal", "virtual", "visual", "pontual", "sideral", "sucursal",
    ]),
    ("alismo", 4, "", &[]),
    ("ivismo", 4, "", &[]),
    ("ismo", 3, "", &["cinismo"]),
];

const VERB: &[RuleRow] = &[
    ("aríamo", 2, "", &[]),
    ("ássemo", 2, "", &[]),
    ("eríamo", 2, "", &[]),
    ("êssemo", 2, "", &[]),
    ("iríamo", 3, "", &[]),
    ("íssemo", 3, "", &[]),
    ("áramo", 2, "", &[]),
    ("árei", 2, "", &[]),
    ("aremo", 2, "", &[]),
    ("ariam", 2, "", &[]),
    ("aríei", 2, "", &[]),
    ("ássei", 2, "", &[]),
    ("assem", 2, "", &[]),
    ("ávamo", 2, "", &[]),
    ("êramo", 3, "", &[]),
    ("eremo", 3, "", &[]),
    ("eriam", 3, "", &[]),
    ("eríei", 3, "", &[]),
    ("êssei", 3, "", &[]),
    ("essem", 3, "", &[]),
    ("íramo", 3, "", &[]),
    ("iremo", 3, "", &[]),
    ("iriam", 3, "", &[]),
    ("iríei", 3, "", &[]),
    ("íssei", 3, "", &[]),
    ("issem", 3, "", &[]),
    ("ando", 2, "", &[]),
    ("endo", 3, "", &[]),
    ("indo", 3, "", &[]),
    ("ondo", 3, "", &[]),
    ("aram", 2, "", &[]),
    ("arão", 2, "", &[]),
    ("arde", 2, "", &[]),
    ("arei", 2, "", &[]),
    ("arem", 2, "", &[]),
    ("aria", 2, "", &[]),
    ("armo", 2, "", &[]),
    ("asse", 2, "", &[]),
    ("aste", 2, "", &[]),
    ("avam", 2, "", &["agravam"]),
    ("ávei", 2, "", &[]),
    ("eram", 3, "", &[]),
    ("erão", 3, "", &[]),
    ("erde", 3, "", &[]),
    ("erei", 3, "", &[]),
    ("êrei", 3, "", &[]),
    ("erem", 3, "", &[]),
    ("eria", 3, "", &[]),
    ("ermo", 3, "", &[]),
    ("esse", 3, "", &[]),
    ("este", 3, "", &["faroeste", "agreste"]),
    ("íamo", 3, "", &[]),
    ("iram", 3, "", &[]),
    ("íram", 3, "", &[]),
    ("irão", 2, "", &[]),
    ("irde", 2, "", &[]),
    ("irei", 3, "", &["admirei"]),
    ("irem", 3, "", &["adquirem"]),
    ("iria", 3, "", &[]),
    ("irmo", 3, "", &[]),
    ("isse", 3, "", &[]),
    ("iste", 4, "", &[]),
    ("iava", 4, "", &["ampliava"]),
    ("amo", 2, "", &[]),
    ("iona", 3, "", &[]),
    ("ara", 2, "", &["arara", "prepara"]),
    ("ará", 2, "", &["alvará"]),
    ("are", 2, "", &["prepare"]),
    ("ava", 2, "", &["agrava"]),
    ("emo", 2, "", &[]),
    ("era", 3, "", &["acelera", "espera"]),
    ("erá", 3, "", &[]),
    ("ere", 3, "", &["espere"]),
    ("iam", 3, "", &["enfiam", "ampliam", "elogiam", "ensaiam"]),
    ("íei", 3, "", &[]),
    ("imo", 3, "", &["reprimo", "intimo", "íntimo", "nimo", "queimo", "ximo"]),
    ("ira", 3, "", &["fronteira", "sátira"]),
    ("ído", 3, "", &[]),
    ("irá", 3, "", &[]),
    ("tizar", 4, "", &["alfabetizar"]),
    ("izar", 5, "", &["organizar"]),
    ("itar", 5, "", &["acreditar", "explicitar", "estreitar"]),
    ("ire", 3, "", &["adquire"]),
    ("omo", 3, "", &[]),
    ("ai", 2, "", &[]),
    ("am", 2, "", &[]),
    ("ear", 4, "", &["alardear", "nuclear"]),
    ("ar", 2, "", &["azar", "bazaar", "patamar"]),
    ("uei", 3, "", &[]),
    ("uía", 5, "u", &[]),
    ("ei", 3, "", &[]),
    ("guem", 3, "g", &[]),
    ("em", 2, "", &["alem", "virgem"]),
    ("er", 2, "", &["éter", "pier"]),
    ("eu", 3, "", &["chapeu"]),
    ("ia", 3, "", &[
        "estória", "fatia", "acia", "praia", "elogia", "mania", "lábia", "aprecia", "polícia",
        "arredia", "cheia", "ásia",
    ]),
    ("ir", 3, "", &["freir"]),
    ("iu", 3, "", &[]),
    ("eou", 5, "", &[]),
    ("ou", 3, "", &[]),
    ("i", 3, "", &[]),
];

const VOWEL: &[RuleRow] = &[
    ("bil", 2, "vel", &[]),
    ("gue", 2, "g", &["gangue", "jegue"]),
    ("á", 3, "", &[]),
    ("ê", 3, "", &["bebê"]),
    ("a", 3, "", &["ásia"]),
    ("e", 3, "", &[]),
    ("o", 3, "", &["ão"]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rslp_stemmer() {
        let stemmer = RslpStemmer::new();

        assert_eq!(stemmer.stem("planos"), "plan");
        assert_eq!(stemmer.stem("cotação"), "cot");
        assert_eq!(stemmer.stem("rapidamente"), "rapid");
        assert_eq!(stemmer.stem("saúde"), "saúd");
        assert_eq!(stemmer.stem("Planos"), "plan");
    }

    #[test]
    fn test_exceptions_block_rules() {
        let stemmer = RslpStemmer::new();

        // "mães" is an exception to the "ães" rule and falls through to "s".
        assert_eq!(stemmer.stem("mães"), "mãe");
        // Too short for any rule.
        assert_eq!(stemmer.stem("olá"), "olá");
    }

    #[test]
    fn test_empty_word() {
        assert_eq!(RslpStemmer::new().stem(""), "");
    }

    #[test]
    fn test_step_requires_ending() {
        let rules = RslpRules::default();
        assert_eq!(rules.plural.apply("plano"), None);
        assert_eq!(rules.plural.apply("planos").as_deref(), Some("plano"));
    }

    #[test]
    fn test_rules_json_roundtrip() {
        let rules = RslpRules::default();
        let json = serde_json::to_string(&rules).unwrap();
        let parsed = RslpRules::from_json(&json).unwrap();
        assert_eq!(parsed, rules);
        assert!(parsed.rule_count() > 200);
    }

    #[test]
    fn test_empty_suffix_is_rejected() {
        let mut rules = RslpRules::default();
        rules.vowel.rules.push(StemRule {
            suffix: String::new(),
            min_stem_size: 0,
            replacement: String::new(),
            exceptions: Vec::new(),
        });
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_stemmer_name() {
        assert_eq!(RslpStemmer::new().name(), "rslp");
    }
}
