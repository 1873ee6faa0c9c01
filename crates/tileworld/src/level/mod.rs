mod codec;
mod store;

pub use codec::CodecError;
pub use store::{
    LevelId, LevelSource, LevelStore, DEFAULT_LEVEL_NAME, LEVEL_FILE_EXTENSION,
    NUMBERED_LEVEL_PREFIX,
};
