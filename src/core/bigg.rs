use crate::domain::model::BiggUniversalReactionResult;
use crate::utils::error::{EtlError, Result};
use std::collections::BTreeMap;

/// Map BiGG universal reaction identifiers to their names.
///
/// Fails when the number of results differs from the declared
/// `results_count`. Reactions without a name are left out.
pub fn reaction_names(response: &str) -> Result<BTreeMap<String, String>> {
    let data: BiggUniversalReactionResult = serde_json::from_str(response)?;

    if data.results.len() != data.results_count {
        return Err(EtlError::InconsistentResponse {
            message: format!(
                "BiGG declared {} universal reactions but returned {}",
                data.results_count,
                data.results.len()
            ),
        });
    }

    Ok(data
        .results
        .into_iter()
        .filter_map(|reaction| match reaction.name {
            Some(name) if !name.is_empty() => Some((reaction.bigg_id, name)),
            _ => None,
        })
        .collect())
}
