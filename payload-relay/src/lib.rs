// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

pub mod config;
pub mod ingress;
pub mod jobs;
pub mod payload;
pub mod sink;
