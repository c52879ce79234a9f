//! Device classifiers.

use survey_flow_types::{DeviceClassifier, DeviceType};

/// Always reports the same device type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDevice(pub DeviceType);

impl DeviceClassifier for FixedDevice {
    fn classify_device(&self) -> DeviceType {
        self.0
    }
}

/// Classifies the device from a browser user-agent string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgentClassifier {
    user_agent: String,
}

impl UserAgentClassifier {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

impl DeviceClassifier for UserAgentClassifier {
    fn classify_device(&self) -> DeviceType {
        let ua = self.user_agent.to_lowercase();
        let android = ua.contains("android");
        if ua.contains("ipad") || ua.contains("tablet") || (android && !ua.contains("mobile")) {
            DeviceType::Tablet
        } else if ua.contains("mobi") || ua.contains("iphone") || android {
            DeviceType::Mobile
        } else {
            DeviceType::Desktop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(ua: &str) -> DeviceType {
        UserAgentClassifier::new(ua).classify_device()
    }

    #[test]
    fn desktop_browsers() {
        assert_eq!(
            classify("Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0"),
            DeviceType::Desktop
        );
        assert_eq!(classify(""), DeviceType::Desktop);
    }

    #[test]
    fn phones() {
        assert_eq!(
            classify("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148"),
            DeviceType::Mobile
        );
        assert_eq!(
            classify("Mozilla/5.0 (Linux; Android 14; Pixel 8) Mobile Safari/537.36"),
            DeviceType::Mobile
        );
    }

    #[test]
    fn tablets() {
        assert_eq!(
            classify("Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) Mobile/15E148"),
            DeviceType::Tablet
        );
        assert_eq!(
            classify("Mozilla/5.0 (Linux; Android 14; SM-X710) Safari/537.36"),
            DeviceType::Tablet
        );
    }
}
