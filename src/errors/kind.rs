//! Closed set of HTTP error variants.
//!
//! One variant per 4xx/5xx status with a registered reason phrase. The table
//! below is the single source for the variant's code, its error name and its
//! default message, and also generates a no-argument constructor on
//! [`HttpError`](crate::errors::HttpError) for each variant.

use axum::http::StatusCode;

macro_rules! error_kinds {
    ($( $variant:ident, $ctor:ident => ($code:literal, $name:literal, $reason:literal); )+) => {
        /// An HTTP error variant keyed by status code.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ErrorKind {
            $( $variant, )+
        }

        impl ErrorKind {
            /// Every known variant, in status-code order.
            pub const ALL: &'static [ErrorKind] = &[ $( ErrorKind::$variant, )+ ];

            /// Look up the variant for a status code.
            ///
            /// Returns `None` for codes below 400 and for codes without a
            /// registered reason phrase.
            pub fn from_status(code: u16) -> Option<Self> {
                match code {
                    $( $code => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Numeric status code.
            pub fn code(self) -> u16 {
                match self {
                    $( Self::$variant => $code, )+
                }
            }

            /// Error name, e.g. `NotFoundError`.
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )+
                }
            }

            /// Standard reason phrase, used as the default message.
            pub fn reason(self) -> &'static str {
                match self {
                    $( Self::$variant => $reason, )+
                }
            }
        }

        impl crate::errors::HttpError {
            $(
                #[doc = concat!("`", $code, " ", $reason, "` with the default message.")]
                pub fn $ctor() -> Self {
                    Self::from_kind(ErrorKind::$variant)
                }
            )+
        }
    };
}

error_kinds! {
    BadRequest, bad_request                                      => (400, "BadRequestError", "Bad Request");
    Unauthorized, unauthorized                                   => (401, "UnauthorizedError", "Unauthorized");
    PaymentRequired, payment_required                            => (402, "PaymentRequiredError", "Payment Required");
    Forbidden, forbidden                                         => (403, "ForbiddenError", "Forbidden");
    NotFound, not_found                                          => (404, "NotFoundError", "Not Found");
    MethodNotAllowed, method_not_allowed                         => (405, "MethodNotAllowedError", "Method Not Allowed");
    NotAcceptable, not_acceptable                                => (406, "NotAcceptableError", "Not Acceptable");
    ProxyAuthenticationRequired, proxy_authentication_required   => (407, "ProxyAuthenticationRequiredError", "Proxy Authentication Required");
    RequestTimeout, request_timeout                              => (408, "RequestTimeoutError", "Request Timeout");
    Conflict, conflict                                           => (409, "ConflictError", "Conflict");
    Gone, gone                                                   => (410, "GoneError", "Gone");
    LengthRequired, length_required                              => (411, "LengthRequiredError", "Length Required");
    PreconditionFailed, precondition_failed                      => (412, "PreconditionFailedError", "Precondition Failed");
    PayloadTooLarge, payload_too_large                           => (413, "PayloadTooLargeError", "Payload Too Large");
    UriTooLong, uri_too_long                                     => (414, "UriTooLongError", "URI Too Long");
    UnsupportedMediaType, unsupported_media_type                 => (415, "UnsupportedMediaTypeError", "Unsupported Media Type");
    RangeNotSatisfiable, range_not_satisfiable                   => (416, "RangeNotSatisfiableError", "Range Not Satisfiable");
    ExpectationFailed, expectation_failed                        => (417, "ExpectationFailedError", "Expectation Failed");
    ImATeapot, im_a_teapot                                       => (418, "ImATeapotError", "I'm a Teapot");
    MisdirectedRequest, misdirected_request                      => (421, "MisdirectedRequestError", "Misdirected Request");
    UnprocessableEntity, unprocessable_entity                    => (422, "UnprocessableEntityError", "Unprocessable Entity");
    Locked, locked                                               => (423, "LockedError", "Locked");
    FailedDependency, failed_dependency                          => (424, "FailedDependencyError", "Failed Dependency");
    TooEarly, too_early                                          => (425, "TooEarlyError", "Too Early");
    UpgradeRequired, upgrade_required                            => (426, "UpgradeRequiredError", "Upgrade Required");
    PreconditionRequired, precondition_required                  => (428, "PreconditionRequiredError", "Precondition Required");
    TooManyRequests, too_many_requests                           => (429, "TooManyRequestsError", "Too Many Requests");
    RequestHeaderFieldsTooLarge, request_header_fields_too_large => (431, "RequestHeaderFieldsTooLargeError", "Request Header Fields Too Large");
    UnavailableForLegalReasons, unavailable_for_legal_reasons    => (451, "UnavailableForLegalReasonsError", "Unavailable For Legal Reasons");
    InternalServerError, internal_server_error                   => (500, "InternalServerError", "Internal Server Error");
    NotImplemented, not_implemented                              => (501, "NotImplementedError", "Not Implemented");
    BadGateway, bad_gateway                                      => (502, "BadGatewayError", "Bad Gateway");
    ServiceUnavailable, service_unavailable                      => (503, "ServiceUnavailableError", "Service Unavailable");
    GatewayTimeout, gateway_timeout                              => (504, "GatewayTimeoutError", "Gateway Timeout");
    HttpVersionNotSupported, http_version_not_supported          => (505, "HttpVersionNotSupportedError", "HTTP Version Not Supported");
    VariantAlsoNegotiates, variant_also_negotiates               => (506, "VariantAlsoNegotiatesError", "Variant Also Negotiates");
    InsufficientStorage, insufficient_storage                    => (507, "InsufficientStorageError", "Insufficient Storage");
    LoopDetected, loop_detected                                  => (508, "LoopDetectedError", "Loop Detected");
    BandwidthLimitExceeded, bandwidth_limit_exceeded             => (509, "BandwidthLimitExceededError", "Bandwidth Limit Exceeded");
    NotExtended, not_extended                                    => (510, "NotExtendedError", "Not Extended");
    NetworkAuthenticationRequired, network_authentication_required => (511, "NetworkAuthenticationRequiredError", "Network Authentication Required");
}

impl ErrorKind {
    /// Status code as an [`http::StatusCode`](StatusCode).
    pub fn status(self) -> StatusCode {
        StatusCode::from_u16(self.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// `true` for 4xx variants.
    pub fn is_client_error(self) -> bool {
        (400..500).contains(&self.code())
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
