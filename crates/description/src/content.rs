use vocab_model::{Partition, ResourceDescription};

/// Whether every partition of `description` is absent or empty
pub fn has_no_content(description: &ResourceDescription) -> bool {
    Partition::ALL
        .iter()
        .all(|p| description.partition(*p).is_empty())
}
