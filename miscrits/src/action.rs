use serde::{Deserialize, Serialize};

use crate::api::LoadSource;
use crate::catalog::{BossEntry, CatalogEntry};
use crate::moves::{DataSource, Dataset};
use crate::patch::PatchOutcome;
use crate::sprite::SpriteInfo;
use crate::state::{InputTarget, Screen};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,
    ScreenSet(Screen),

    CatalogDidLoad(Vec<CatalogEntry>),
    CatalogDidError(String),
    CatalogRetry,
    CatalogTabToggle,
    CatalogMove(i16),
    CatalogSelect(usize),
    CatalogPage(i16),
    CatalogRarityNext,
    CatalogElementNext,
    CatalogFilterClear,
    CatalogOpen,

    BossesDidLoad(Vec<BossEntry>),
    BossesDidError(String),

    SpriteInfoDidLoad(Vec<SpriteInfo>),

    InputStart(InputTarget),
    InputChar(char),
    InputBackspace,
    InputSubmit,
    InputCancel,

    PatchStageMove(i16),
    PatchStageCursor(usize),
    PatchStageSelect,
    PatchModeToggle,
    PatchScale(i8),
    PatchScaleReset,
    PatchAspectToggle,
    PatchEncode,
    PatchDidEncode(PatchOutcome),
    PatchDidError(String),
    EncoderDidCheck(Option<String>),

    MovesLoad(LoadSource),
    MovesDidLoad { dataset: Dataset, source: DataSource },
    MovesDidError(String),
    MovesFocusToggle,
    MovesCreatureMove(i16),
    MovesCreatureSelect(usize),
    MovesAbilityMove(i16),
    MovesAbilitySelect(usize),
    MovesTypeCycle(i32),
    MovesCommit,
    MovesRevert,
    MovesAbilityUp,
    MovesAbilityDown,
    MovesApStep(i64),
    MovesTrueDamageToggle,
    MovesLogToggle,
    MovesExport,
    ExportDidWrite(String),
    ExportDidError(String),

    UiTerminalResize(u16, u16),
    Tick,
    Quit,
}
