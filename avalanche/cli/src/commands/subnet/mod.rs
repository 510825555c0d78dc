// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

use crate::commands::subnet::configure::{ConfigureSubnet, ConfigureSubnetArgs};
use crate::commands::subnet::create::{CreateSubnet, CreateSubnetArgs};
use crate::commands::subnet::delete::{DeleteSubnet, DeleteSubnetArgs};
use crate::commands::subnet::deploy::{DeploySubnet, DeploySubnetArgs};
use crate::commands::subnet::describe::{DescribeSubnet, DescribeSubnetArgs};
use crate::commands::subnet::elastic::{ElasticSubnet, ElasticSubnetArgs};
use crate::commands::subnet::export::{ExportSubnet, ExportSubnetArgs};
use crate::commands::subnet::import::{ImportSubnet, ImportSubnetArgs};
use crate::commands::subnet::join::{JoinSubnet, JoinSubnetArgs};
use crate::commands::subnet::list_subnets::{ListSubnets, ListSubnetsArgs};
use crate::commands::subnet::publish::{PublishSubnet, PublishSubnetArgs};
use crate::commands::subnet::stats::{
    ListValidators, ListValidatorsArgs, SubnetStats, SubnetStatsArgs,
};
use crate::commands::subnet::vmid::{VmIdSubnet, VmIdSubnetArgs};
use crate::{CommandLineHandler, GlobalArguments};
use clap::{Args, Subcommand};

use self::validator::{
    AddValidator, AddValidatorArgs, RemoveValidator, RemoveValidatorArgs, TransferOwnership,
    TransferOwnershipArgs,
};

mod configure;
mod create;
mod delete;
mod deploy;
mod describe;
mod elastic;
mod export;
mod import;
mod join;
mod list_subnets;
mod publish;
mod stats;
mod validator;
mod vmid;

#[derive(Debug, Args)]
#[command(
    name = "subnet",
    about = "subnet related commands such as create, deploy, addValidator and etc"
)]
#[command(args_conflicts_with_subcommands = true)]
pub(crate) struct SubnetCommandsArgs {
    #[command(subcommand)]
    command: Commands,
}

impl SubnetCommandsArgs {
    pub async fn handle(&self, global: &GlobalArguments) -> anyhow::Result<()> {
        match &self.command {
            Commands::Create(args) => CreateSubnet::handle(global, args).await,
            Commands::Deploy(args) => DeploySubnet::handle(global, args).await,
            Commands::Describe(args) => DescribeSubnet::handle(global, args).await,
            Commands::List(args) => ListSubnets::handle(global, args).await,
            Commands::Delete(args) => DeleteSubnet::handle(global, args).await,
            Commands::AddValidator(args) => AddValidator::handle(global, args).await,
            Commands::RemoveValidator(args) => RemoveValidator::handle(global, args).await,
            Commands::Elastic(args) => ElasticSubnet::handle(global, args).await,
            Commands::Export(args) => ExportSubnet::handle(global, args).await,
            Commands::Import(args) => ImportSubnet::handle(global, args).await,
            Commands::Publish(args) => PublishSubnet::handle(global, args).await,
            Commands::Join(args) => JoinSubnet::handle(global, args).await,
            Commands::Vmid(args) => VmIdSubnet::handle(global, args).await,
            Commands::Configure(args) => ConfigureSubnet::handle(global, args).await,
            Commands::TransferOwnership(args) => TransferOwnership::handle(global, args).await,
            Commands::Validators(args) => ListValidators::handle(global, args).await,
            Commands::Stats(args) => SubnetStats::handle(global, args).await,
        }
    }
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    Create(CreateSubnetArgs),
    Deploy(DeploySubnetArgs),
    Describe(DescribeSubnetArgs),
    List(ListSubnetsArgs),
    Delete(DeleteSubnetArgs),
    #[command(name = "addValidator")]
    AddValidator(AddValidatorArgs),
    #[command(name = "removeValidator")]
    RemoveValidator(RemoveValidatorArgs),
    Elastic(ElasticSubnetArgs),
    Export(ExportSubnetArgs),
    Import(ImportSubnetArgs),
    Publish(PublishSubnetArgs),
    Join(JoinSubnetArgs),
    Vmid(VmIdSubnetArgs),
    Configure(ConfigureSubnetArgs),
    #[command(name = "transferOwnership")]
    TransferOwnership(TransferOwnershipArgs),
    Validators(ListValidatorsArgs),
    Stats(SubnetStatsArgs),
}
