use crate::api::LoadSource;
use crate::patch::PatchOutcome;
use crate::sprite::{EditMode, ResizePlan};

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadCatalog,
    LoadBosses,
    LoadSpriteInfo { urls: Vec<String> },
    CheckEncoder,
    EncodePatch {
        name: String,
        mode: EditMode,
        upload_path: String,
        plan: ResizePlan,
        previous: Option<PatchOutcome>,
    },
    LoadDataset { source: LoadSource },
    WriteExport { bytes: Vec<u8> },
}
