//! NLP module - complaint phrase mining

mod complaints;

pub use complaints::{
    candidate_bigrams, tokenize, ComplaintExtractor, ComplaintPhrase, DEFAULT_TOP_N,
    NEUTRAL_PHRASES,
};
