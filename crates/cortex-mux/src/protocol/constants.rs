//! Protocol constants for method names, error codes, and stream names.

/// Known Cortex API method names.
pub struct Methods;

impl Methods {
    // ─── Authentication ─────────────────────────────────────────────

    /// Get the currently logged-in user.
    pub const GET_USER_LOGIN: &'static str = "getUserLogin";

    /// Log a user in to EmotivID.
    pub const LOGIN: &'static str = "login";

    /// Log the current user out.
    pub const LOGOUT: &'static str = "logout";

    /// Request application access from the user.
    pub const REQUEST_ACCESS: &'static str = "requestAccess";

    /// Check if the app has been granted access.
    pub const HAS_ACCESS_RIGHT: &'static str = "hasAccessRight";

    /// Authorize and obtain a cortex token.
    pub const AUTHORIZE: &'static str = "authorize";

    // ─── Headset Management ─────────────────────────────────────────

    /// Control (connect/disconnect/refresh) a specific headset.
    pub const CONTROL_DEVICE: &'static str = "controlDevice";

    /// Query available headsets.
    pub const QUERY_HEADSETS: &'static str = "queryHeadsets";

    // ─── Session Management ─────────────────────────────────────────

    /// Create a session (associates a headset with a cortex token).
    pub const CREATE_SESSION: &'static str = "createSession";

    /// Update a session (activate, close).
    pub const UPDATE_SESSION: &'static str = "updateSession";

    // ─── Data Streams ───────────────────────────────────────────────

    /// Subscribe to data streams (fac, mot, pow, met, com).
    pub const SUBSCRIBE: &'static str = "subscribe";

    /// Unsubscribe from data streams.
    pub const UNSUBSCRIBE: &'static str = "unsubscribe";

    // ─── Profiles ───────────────────────────────────────────────────

    /// List user profiles.
    pub const QUERY_PROFILE: &'static str = "queryProfile";

    /// Get the profile loaded for a headset.
    pub const GET_CURRENT_PROFILE: &'static str = "getCurrentProfile";

    /// Manage profiles (create, load, unload, save).
    pub const SETUP_PROFILE: &'static str = "setupProfile";

    /// Load an empty guest profile for a headset.
    pub const LOAD_GUEST_PROFILE: &'static str = "loadGuestProfile";

    // ─── Detections ─────────────────────────────────────────────────

    /// Get available actions/controls/events for a detection type.
    pub const GET_DETECTION_INFO: &'static str = "getDetectionInfo";

    /// Get a list of trained actions of a profile.
    pub const GET_TRAINED_SIGNATURE_ACTIONS: &'static str = "getTrainedSignatureActions";

    /// Get or set the threshold of a facial expression action.
    pub const FACIAL_EXPRESSION_THRESHOLD: &'static str = "facialExpressionThreshold";

    /// Get or set active mental command actions.
    pub const MENTAL_COMMAND_ACTIVE_ACTION: &'static str = "mentalCommandActiveAction";

    /// Get or set mental command action sensitivity.
    pub const MENTAL_COMMAND_ACTION_SENSITIVITY: &'static str = "mentalCommandActionSensitivity";
}

// ─── Error Codes ────────────────────────────────────────────────────────

/// Cortex API error codes.
pub struct ErrorCodes;

impl ErrorCodes {
    /// Method not found (unknown or deprecated method name).
    pub const METHOD_NOT_FOUND: i32 = -32601;

    /// No headset connected.
    pub const NO_HEADSET_CONNECTED: i32 = -32001;

    /// Headset unavailable.
    pub const HEADSET_UNAVAILABLE: i32 = -32004;

    /// Session already exists.
    pub const SESSION_ALREADY_EXISTS: i32 = -32005;

    /// Session must be activated before this operation.
    pub const SESSION_MUST_BE_ACTIVATED: i32 = -32012;

    /// Invalid cortex token.
    pub const INVALID_CORTEX_TOKEN: i32 = -32014;

    /// Cortex token expired.
    pub const TOKEN_EXPIRED: i32 = -32015;

    /// Invalid stream for subscribe/unsubscribe.
    pub const INVALID_STREAM: i32 = -32016;

    /// Invalid or unknown training profile.
    pub const INVALID_PROFILE: i32 = -32020;

    /// Invalid client credentials.
    pub const INVALID_CLIENT_CREDENTIALS: i32 = -32021;

    /// User not logged in to EmotivID in the Launcher.
    pub const USER_NOT_LOGGED_IN: i32 = -32033;

    /// Profile loaded by another application.
    pub const PROFILE_CONFLICT: i32 = -32108;

    /// Headset not ready yet.
    pub const HEADSET_NOT_READY: i32 = -32152;
}

// ─── Stream Names ───────────────────────────────────────────────────────

/// Known Cortex data stream names for subscribe/unsubscribe.
///
/// The stream name doubles as the payload key on unsolicited data frames,
/// which is how the response router classifies them.
pub struct Streams;

impl Streams {
    /// Facial expressions: eye/face actions + power.
    pub const FAC: &'static str = "fac";
    /// Motion/IMU: gyroscope, accelerometer, magnetometer, quaternion.
    pub const MOT: &'static str = "mot";
    /// Band power: theta/alpha/betaL/betaH/gamma per sensor.
    pub const POW: &'static str = "pow";
    /// Performance metrics: engagement, stress, focus, etc.
    pub const MET: &'static str = "met";
    /// Mental commands: action + power (requires profile).
    pub const COM: &'static str = "com";

    /// All stream names this multiplexer routes.
    pub const ALL: &'static [&'static str] =
        &[Self::FAC, Self::MOT, Self::POW, Self::MET, Self::COM];
}
