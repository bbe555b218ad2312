// Entity recognition: three independent sources fanned out over the extracted
// text, then reconciled into a single candidate record.

pub mod linguistic;
pub mod models;
pub mod patterns;
pub mod recognizer;
pub mod reconcile;
pub mod statistical;

pub use linguistic::{LinguisticPipeline, LinguisticSource};
pub use models::EntityRecord;
pub use recognizer::{EntityRecognizer, EntitySource, RecognizerTimeouts};
pub use reconcile::reconcile;
pub use statistical::StatisticalNerModel;
