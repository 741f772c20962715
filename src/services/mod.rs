pub mod classification_service;
