//! Vocabulary IRIs used by hierarchy defaults and the lexicalization rank table.

/// RDF vocabulary constants
pub mod rdf {
    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

/// RDFS vocabulary constants
pub mod rdfs {
    /// rdfs:label IRI
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

    /// rdfs:comment IRI
    pub const COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";

    /// rdfs:subClassOf IRI
    pub const SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";

    /// rdfs:subPropertyOf IRI
    pub const SUB_PROPERTY_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subPropertyOf";
}

/// OWL vocabulary constants
pub mod owl {
    /// owl:Thing IRI
    pub const THING: &str = "http://www.w3.org/2002/07/owl#Thing";

    /// owl:inverseOf IRI
    pub const INVERSE_OF: &str = "http://www.w3.org/2002/07/owl#inverseOf";
}

/// SKOS vocabulary constants
pub mod skos {
    pub const CONCEPT: &str = "http://www.w3.org/2004/02/skos/core#Concept";
    pub const CONCEPT_SCHEME: &str = "http://www.w3.org/2004/02/skos/core#ConceptScheme";

    pub const BROADER: &str = "http://www.w3.org/2004/02/skos/core#broader";
    pub const NARROWER: &str = "http://www.w3.org/2004/02/skos/core#narrower";
    pub const BROADER_TRANSITIVE: &str = "http://www.w3.org/2004/02/skos/core#broaderTransitive";
    pub const NARROWER_TRANSITIVE: &str = "http://www.w3.org/2004/02/skos/core#narrowerTransitive";
    pub const BROAD_MATCH: &str = "http://www.w3.org/2004/02/skos/core#broadMatch";
    pub const NARROW_MATCH: &str = "http://www.w3.org/2004/02/skos/core#narrowMatch";

    pub const IN_SCHEME: &str = "http://www.w3.org/2004/02/skos/core#inScheme";
    pub const TOP_CONCEPT_OF: &str = "http://www.w3.org/2004/02/skos/core#topConceptOf";

    pub const PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";
    pub const ALT_LABEL: &str = "http://www.w3.org/2004/02/skos/core#altLabel";
    pub const HIDDEN_LABEL: &str = "http://www.w3.org/2004/02/skos/core#hiddenLabel";

    pub const NOTE: &str = "http://www.w3.org/2004/02/skos/core#note";
    pub const DEFINITION: &str = "http://www.w3.org/2004/02/skos/core#definition";
}

/// SKOS-XL vocabulary constants
pub mod skosxl {
    pub const LABEL: &str = "http://www.w3.org/2008/05/skos-xl#Label";
    pub const PREF_LABEL: &str = "http://www.w3.org/2008/05/skos-xl#prefLabel";
    pub const ALT_LABEL: &str = "http://www.w3.org/2008/05/skos-xl#altLabel";
    pub const HIDDEN_LABEL: &str = "http://www.w3.org/2008/05/skos-xl#hiddenLabel";
    pub const LITERAL_FORM: &str = "http://www.w3.org/2008/05/skos-xl#literalForm";
}

/// OntoLex-Lemon vocabulary constants
pub mod ontolex {
    pub const IS_DENOTED_BY: &str = "http://www.w3.org/ns/lemon/ontolex#isDenotedBy";
    pub const IS_EVOKED_BY: &str = "http://www.w3.org/ns/lemon/ontolex#isEvokedBy";
}
