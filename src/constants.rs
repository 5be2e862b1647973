// ABOUTME: User-facing strings shared by the dispatcher, notifier, and TUI.
// ABOUTME: Error base messages here are wrapped by error::build_error_message.

pub const APP_NAME: &str = "deskchat";

pub const APP_BOOT_MESSAGE: &str = "deskchat session started";

pub const INITIAL_AI_MESSAGE: &str = "Hello! I'm the support assistant. Ask me anything about our products and services.";

pub const INITIAL_CONTACT_MESSAGE: &str = "Contact mode is on. Describe your question and it will be forwarded to a member of staff.";

pub const CHAT_INPUT_HELPER_TEXT: &str = "Type a message (Enter to send, Ctrl+T toggles contact mode)";

pub const SPINNER_TEXT: &str = "Generating an answer...";

pub const SPINNER_CONTACT_TEXT: &str = "Forwarding your inquiry to staff...";

pub const CONTACT_THANKS_MESSAGE: &str = "Thank you. Your inquiry has been sent to our staff, who will get back to you shortly.";

pub const INPUT_TEXT_LIMIT_ERROR_MESSAGE: &str = "The message is too long. Please shorten it and send it again.";

pub const INITIALIZE_ERROR_MESSAGE: &str = "Initialization failed.";

pub const CONVERSATION_LOG_ERROR_MESSAGE: &str = "Failed to display the conversation log.";

pub const MAIN_PROCESS_ERROR_MESSAGE: &str = "Failed to process your message.";

pub const DISP_ANSWER_ERROR_MESSAGE: &str = "Failed to display the answer.";

pub const COMMON_ERROR_MESSAGE: &str = "If the problem persists, please contact the system administrator.";
