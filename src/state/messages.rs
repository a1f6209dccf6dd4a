use crate::state::network::LoadingState;
use crate::state::view::{LoadRequest, ViewContent};
use bgl_api::ApiResult;
use crossterm::event::KeyEvent;

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    Load(LoadRequest),
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    /// Outcome of one `Load`, echoed with its request so the controller can
    /// tell whether it is still wanted.
    Loaded {
        request: LoadRequest,
        result: ApiResult<ViewContent>,
    },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    PhaseTick,
}
