use crate::rank::{predicate_rank, LexicalizationModel};
use serde::Serialize;
use vocab_model::vocab::skos;
use vocab_model::{ObjectNode, Partition, PredicateObjectsGroup, ResourceDescription};

/// Groups carried by one language tag
#[derive(Debug, Clone, Serialize)]
pub struct LanguageEntry {
    pub lang: String,
    pub groups: Vec<PredicateObjectsGroup>,
}

/// Language tag → predicate groups, in first-encountered language order
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct LanguageView {
    entries: Vec<LanguageEntry>,
}

impl LanguageView {
    pub fn entries(&self) -> &[LanguageEntry] {
        &self.entries
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.lang.as_str())
    }

    pub fn groups(&self, lang: &str) -> Option<&[PredicateObjectsGroup]> {
        self.entries
            .iter()
            .find(|e| e.lang == lang)
            .map(|e| e.groups.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn entry_mut(&mut self, lang: &str) -> &mut LanguageEntry {
        let pos = match self.entries.iter().position(|e| e.lang == lang) {
            Some(pos) => pos,
            None => {
                self.entries.push(LanguageEntry {
                    lang: lang.to_string(),
                    groups: Vec::new(),
                });
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos]
    }
}

/// Merges the lexicalizations and definitions of a description per language
///
/// Lexicalization groups of each language are ordered by the rank the
/// project's lexicalization model gives their predicate.
#[derive(Debug, Clone, Copy)]
pub struct LanguageAssembler {
    model: LexicalizationModel,
}

impl LanguageAssembler {
    pub fn new(model: LexicalizationModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> LexicalizationModel {
        self.model
    }

    /// Rebuild the language view of `description`
    pub fn assemble(&self, description: &ResourceDescription) -> LanguageView {
        let mut view = LanguageView::default();

        for group in description.partition(Partition::Lexicalizations) {
            for object in &group.objects {
                self.merge(&mut view, group, object, true);
            }
        }

        for group in description
            .partition(Partition::Notes)
            .iter()
            .filter(|g| g.predicate.id == skos::DEFINITION)
        {
            for object in &group.objects {
                self.merge(&mut view, group, object, false);
            }
        }

        log::trace!(
            "assembled {} language(s) for {}",
            view.len(),
            description.resource.id
        );
        view
    }

    fn merge(
        &self,
        view: &mut LanguageView,
        group: &PredicateObjectsGroup,
        object: &ObjectNode,
        ranked: bool,
    ) {
        let Some(lang) = object.language() else {
            return;
        };
        let entry = view.entry_mut(lang);

        if let Some(existing) = entry
            .groups
            .iter_mut()
            .find(|g| g.predicate.same_identity(&group.predicate.id))
        {
            if !existing.contains(object) {
                existing.objects.push(object.clone());
            }
            return;
        }

        entry.groups.push(PredicateObjectsGroup::new(
            group.predicate.clone(),
            vec![object.clone()],
        ));
        if ranked {
            let model = self.model;
            entry
                .groups
                .sort_by_key(|g| predicate_rank(model, &g.predicate.id).unwrap_or(u8::MAX));
        }
    }
}

/// Language view of `description` under `model`
pub fn assemble(description: &ResourceDescription, model: LexicalizationModel) -> LanguageView {
    LanguageAssembler::new(model).assemble(description)
}
