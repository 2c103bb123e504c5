mod knowledge;

pub use knowledge::KnowledgeBase;
