use crate::service::InverseOracle;
use std::sync::Arc;
use vocab_model::{HierarchyConfiguration, ResourceRef, Result};

/// Keeps the broader and narrower property lists of a
/// [`HierarchyConfiguration`] paired through declared inverses.
pub struct InverseSynchronizer {
    oracle: Arc<dyn InverseOracle>,
}

impl InverseSynchronizer {
    pub fn new(oracle: Arc<dyn InverseOracle>) -> Self {
        Self { oracle }
    }

    /// Insert the inverse of every broader property missing from the narrower
    /// list, at the index of the property it pairs with. Returns the number of
    /// inserted properties.
    pub async fn sync_from_broader(&self, config: &mut HierarchyConfiguration) -> Result<usize> {
        let inverses = self.oracle.get_inverses(&config.broader_props).await?;
        Ok(merge_inverses(
            &config.broader_props,
            &mut config.narrower_props,
            inverses,
        ))
    }

    /// Mirror of [`Self::sync_from_broader`]
    pub async fn sync_from_narrower(&self, config: &mut HierarchyConfiguration) -> Result<usize> {
        let inverses = self.oracle.get_inverses(&config.narrower_props).await?;
        Ok(merge_inverses(
            &config.narrower_props,
            &mut config.broader_props,
            inverses,
        ))
    }

    /// Append `prop` to the broader list; with `sync_inverse`, pair it.
    ///
    /// Returns false when the property was already listed. The configuration
    /// is untouched when the oracle fails.
    pub async fn add_broader(
        &self,
        config: &mut HierarchyConfiguration,
        prop: ResourceRef,
    ) -> Result<bool> {
        if config.has_broader(&prop.id) {
            return Ok(false);
        }
        let mut staged = config.clone();
        staged.broader_props.push(prop);
        if staged.sync_inverse {
            self.sync_from_broader(&mut staged).await?;
        }
        *config = staged;
        Ok(true)
    }

    /// Append `prop` to the narrower list; with `sync_inverse`, pair it.
    pub async fn add_narrower(
        &self,
        config: &mut HierarchyConfiguration,
        prop: ResourceRef,
    ) -> Result<bool> {
        if config.has_narrower(&prop.id) {
            return Ok(false);
        }
        let mut staged = config.clone();
        staged.narrower_props.push(prop);
        if staged.sync_inverse {
            self.sync_from_narrower(&mut staged).await?;
        }
        *config = staged;
        Ok(true)
    }

    /// Remove `prop` from the broader list; with `sync_inverse`, its inverse
    /// leaves the narrower list too. The configuration is untouched when the
    /// oracle fails.
    pub async fn remove_broader(
        &self,
        config: &mut HierarchyConfiguration,
        prop: &ResourceRef,
    ) -> Result<bool> {
        let inverses = if config.sync_inverse {
            self.oracle.get_inverses(std::slice::from_ref(prop)).await?
        } else {
            Vec::new()
        };
        let removed = remove_paired(
            &mut config.broader_props,
            &mut config.narrower_props,
            prop,
            &inverses,
        );
        Ok(removed)
    }

    /// Mirror of [`Self::remove_broader`]
    pub async fn remove_narrower(
        &self,
        config: &mut HierarchyConfiguration,
        prop: &ResourceRef,
    ) -> Result<bool> {
        let inverses = if config.sync_inverse {
            self.oracle.get_inverses(std::slice::from_ref(prop)).await?
        } else {
            Vec::new()
        };
        let removed = remove_paired(
            &mut config.narrower_props,
            &mut config.broader_props,
            prop,
            &inverses,
        );
        Ok(removed)
    }

    /// Flip `sync_inverse`; turning it on pairs both lists once, broader first.
    ///
    /// Nothing changes, flag included, when the oracle fails.
    pub async fn set_sync_inverse(
        &self,
        config: &mut HierarchyConfiguration,
        enabled: bool,
    ) -> Result<()> {
        if !enabled || config.sync_inverse {
            config.sync_inverse = enabled;
            return Ok(());
        }
        let mut staged = config.clone();
        staged.sync_inverse = true;
        let from_broader = self.sync_from_broader(&mut staged).await?;
        let from_narrower = self.sync_from_narrower(&mut staged).await?;
        log::debug!(
            "inverse sync enabled: {from_broader} narrower and {from_narrower} broader properties added"
        );
        *config = staged;
        Ok(())
    }
}

fn merge_inverses(
    source: &[ResourceRef],
    target: &mut Vec<ResourceRef>,
    inverses: Vec<ResourceRef>,
) -> usize {
    let mut inserted = 0;
    for inverse in inverses {
        if target.contains(&inverse) {
            continue;
        }
        let paired_at = inverse
            .attributes
            .inverse_of
            .as_deref()
            .and_then(|of| source.iter().position(|p| p.same_identity(of)));
        match paired_at {
            Some(idx) => target.insert(idx.min(target.len()), inverse),
            None => {
                log::debug!("inverse {inverse} does not pair with a listed property, appending");
                target.push(inverse);
            }
        }
        inserted += 1;
    }
    inserted
}

fn remove_paired(
    list: &mut Vec<ResourceRef>,
    other: &mut Vec<ResourceRef>,
    prop: &ResourceRef,
    inverses: &[ResourceRef],
) -> bool {
    let before = list.len();
    list.retain(|p| p != prop);
    if before == list.len() {
        return false;
    }
    other.retain(|p| !inverses.contains(p));
    true
}
