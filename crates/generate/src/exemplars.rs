use serde::{Deserialize, Serialize};

use graph::{Error, Result};

/// Example question paired with the query that answers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exemplar {
    pub question: String,
    pub query: String,
}

impl Exemplar {
    pub fn new(question: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            query: query.into(),
        }
    }
}

/// Parse a JSON array of `{question, query}` records.
pub fn exemplars_from_json(json: &str) -> Result<Vec<Exemplar>> {
    let exemplars: Vec<Exemplar> = serde_json::from_str(json)
        .map_err(|e| Error::config(format!("invalid exemplar file: {e}")))?;

    if exemplars.is_empty() {
        return Err(Error::config("exemplar file contains no examples"));
    }

    Ok(exemplars)
}

/// Built-in few-shot set: ranking with a limit, target-to-disease and
/// drug-to-target traversals, and drug indications.
pub fn default_exemplars() -> Vec<Exemplar> {
    vec![
        Exemplar::new(
            "What are the top 5 diseases associated with APOE?",
            r#"query top_n_associated_diseases {
  search(queryString: "APOE", entityNames: "target") {
    hits {
      id
      object {
        ... on Target {
          associatedDiseases(page: { index: 0, size: 5 }) {
            rows {
              score
              disease {
                name
              }
            }
          }
        }
      }
    }
  }
}"#,
        ),
        Exemplar::new(
            "What are the top drugs that can treat ulcerative colitis?",
            r#"query known_drugs_for_ulcerative_colitis {
  disease(efoId: "EFO_0000729") {
    name
    knownDrugs {
      uniqueDrugs
      rows {
        phase
        status
        drug {
          id
          name
        }
      }
    }
  }
}"#,
        ),
        Exemplar::new(
            "What are the main targets of vorinostat?",
            r#"query targets_of_vorinostat {
  drug(chemblId: "CHEMBL98") {
    name
    mechanismsOfAction {
      rows {
        mechanismOfAction
        targets {
          id
          approvedSymbol
        }
      }
    }
  }
}"#,
        ),
        Exemplar::new(
            "Tell me the diseases treated by Tamoxifen.",
            r#"query diseases_treated_by_tamoxifen {
  drug(chemblId: "CHEMBL83") {
    name
    indications {
      rows {
        maxPhaseForIndication
        disease {
          id
          name
        }
      }
    }
  }
}"#,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_exemplars_are_queries() {
        let exemplars = default_exemplars();
        assert_eq!(exemplars.len(), 4);
        for exemplar in &exemplars {
            assert!(exemplar.query.starts_with("query "));
            assert!(!exemplar.question.is_empty());
        }
    }

    #[test]
    fn test_exemplars_from_json() {
        let json = r#"[{"question": "What is EFO_1?", "query": "query q { disease(efoId: \"EFO_1\") { name } }"}]"#;
        let exemplars = exemplars_from_json(json).unwrap();
        assert_eq!(exemplars[0].question, "What is EFO_1?");
    }

    #[test]
    fn test_exemplars_from_json_rejects_empty() {
        assert!(matches!(exemplars_from_json("[]"), Err(Error::Config(_))));
        assert!(matches!(exemplars_from_json("{"), Err(Error::Config(_))));
    }
}
