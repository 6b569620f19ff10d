//! Commands Module
//!
//! UI 레이어에서 호출하는 명령어 정의

pub mod credentials;
