pub mod boundary;
pub mod extract;
pub mod normalize;
pub mod record;

pub use boundary::{BoundaryPattern, LineBoundary};
pub use extract::extract_sections;
pub use normalize::normalize;
pub use record::{
    CodeFamily, MappingRecord, MappingType, ParseCodeFamilyError, ParseMappingTypeError,
    SectionId, SectionRecord, StoredSection,
};
