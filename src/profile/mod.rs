// Profile module - the event model shared by capture and analysis
//
// 1. AttributeId / AttributeMap: closed attribute vocabulary
// 2. DominanceEvent / TastingProfile: immutable captured timeline
// 3. intervals: merge and coverage arithmetic
// 4. ProfileRecord: export-row codec (one interval array per attribute)

pub mod attribute;
pub mod event;
pub mod intervals;
pub mod record;

pub use attribute::{AttributeId, AttributeMap, UnknownAttribute};
pub use event::{DominanceEvent, Phase, ProfileId, ProfileKey, TastingMode, TastingProfile};
pub use intervals::{covered_within, merge_intervals, merged_by_attribute, Interval};
pub use record::{round_centis, IntervalEntry, ProfileRecord};
